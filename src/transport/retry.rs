use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{BoxError, Error};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

/// Sends `request`, retrying network failures with exponential backoff.
///
/// Only failures to get a response at all are retried. A 404 is handed back
/// immediately, a 401 aborts with [`Error::Auth`], and any other status is
/// returned to the caller as-is. Cancelling `cancel` drops the in-flight
/// request or skips the pending backoff and yields [`Error::Cancelled`].
pub async fn fetch_with_retry<T: HttpTransport>(
    transport: &T,
    request: &HttpRequest,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<HttpResponse, Error> {
    let attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut last_error: Option<BoxError> = None;

    for attempt in 1..=attempts {
        debug!(url = %request.url, method = ?request.method, attempt, attempts, "sending request");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(request)),
            outcome = transport.send(request) => outcome,
        };

        match outcome {
            Ok(response) if response.status == 404 => {
                warn!(url = %request.url, "endpoint not found, not retrying");
                return Ok(response);
            }
            Ok(response) if response.status == 401 => {
                warn!(url = %request.url, "authentication rejected, not retrying");
                return Err(Error::Auth {
                    url: request.url.clone(),
                });
            }
            Ok(response) => return Ok(response),
            Err(error) => {
                warn!(url = %request.url, attempt, attempts, %error, "request failed");
                last_error = Some(error);

                if attempt < attempts {
                    debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(cancelled(request)),
                        _ = tokio::time::sleep(delay) => {}
                    }

                    delay = delay.saturating_mul(2);
                }
            }
        }
    }

    warn!(url = %request.url, attempts, "all attempts failed");

    Err(Error::Transport {
        url: request.url.clone(),
        attempts,
        source: last_error.unwrap_or_else(|| "no attempt was made".into()),
    })
}

fn cancelled(request: &HttpRequest) -> Error {
    Error::Cancelled {
        url: request.url.clone(),
    }
}
