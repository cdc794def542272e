//! Client for the code-analysis backend (`{api_base}/v1/code-analysis`).
//!
//! Every endpoint goes through [`fetch_with_retry`] with the caller's
//! cancellation token. The endpoints callers poll, `progress` and
//! `fetch_analysis_results`, never fail: when the backend is unreachable they
//! answer from the [`ResultCache`] or with an offline stand-in.

mod model;

use chrono::Utc;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use model::{AnalysisProgress, FetchFailure, ResultsOutcome, StartRequest, TaskHandle, TaskKind};

use crate::auth::{AuthProvider, auth_headers};
use crate::cache::ResultCache;
use crate::error::Error;
use crate::normalize::{NormalizedResult, locate_ai_results, normalize};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, RetryPolicy, fetch_with_retry};

pub const API_PATH: &str = "/v1/code-analysis";

const MISSING_MODEL_MARKERS: &[&str] = &["未找到可用的AI模型", "no available AI model"];
const MISSING_MODEL_HINT: &str =
    "no available AI model, make sure an AI model is configured and its API key is saved";

pub struct AnalysisClient<T: HttpTransport> {
    transport: T,
    auth: Box<dyn AuthProvider>,
    base_url: String,
    retry: RetryPolicy,
}

impl<T: HttpTransport> AnalysisClient<T> {
    pub fn new(transport: T, auth: Box<dyn AuthProvider>, api_base: &str) -> Self {
        Self {
            transport,
            auth,
            base_url: format!("{}{API_PATH}", api_base.trim_end_matches('/')),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, Error> {
        let request = request.with_headers(auth_headers(self.auth.as_ref()));
        fetch_with_retry(&self.transport, &request, &self.retry, cancel).await
    }

    // for endpoints where anything but a 2xx JSON body is a failure
    async fn send_json(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<Value, Error> {
        let url = request.url.clone();
        let response = self.send(request, cancel).await?;

        if response.status == 404 {
            return Err(Error::NotFound { url });
        }

        if !response.is_success() {
            return Err(Error::Status {
                url,
                status: response.status,
                message: failure_message(&response),
            });
        }

        response
            .json()
            .map_err(|source| Error::InvalidBody { url, source })
    }

    pub async fn initialize(&self, cancel: &CancellationToken) -> Result<Value, Error> {
        let request = HttpRequest::post(self.endpoint("initialize"), json!({}));
        let data = self.send_json(request, cancel).await?;

        info!(task_id = ?data.get("taskId"), "analysis task initialized");
        Ok(data)
    }

    /// Creates a backend task, or an offline `local_<millis>` one when the
    /// backend cannot create it.
    pub async fn create_task(&self, kind: TaskKind, cancel: &CancellationToken) -> TaskHandle {
        let request = HttpRequest::post(self.endpoint("create"), json!({ "type": kind }));

        let created = self.send_json(request, cancel).await.and_then(|data| {
            serde_json::from_value::<TaskHandle>(data).map_err(|source| Error::InvalidBody {
                url: self.endpoint("create"),
                source,
            })
        });

        match created {
            Ok(handle) => {
                info!(task_id = %handle.task_id, "analysis task created");
                handle
            }
            Err(error) => {
                warn!(%error, "failed to create task, continuing offline");
                TaskHandle {
                    task_id: format!("local_{}", Utc::now().timestamp_millis()),
                    message: "task created in offline mode".to_string(),
                    kind,
                    offline: true,
                }
            }
        }
    }

    pub async fn start(
        &self,
        task_id: &str,
        request: &StartRequest,
        cancel: &CancellationToken,
    ) -> Result<Value, Error> {
        debug!(
            task_id,
            rules = request.rule_ids.len(),
            project = request.is_project,
            "starting analysis"
        );

        let body = serde_json::to_value(request).map_err(|source| Error::InvalidBody {
            url: self.endpoint(&format!("{task_id}/start")),
            source,
        })?;

        let request = HttpRequest::post(self.endpoint(&format!("{task_id}/start")), body);
        self.send_json(request, cancel).await
    }

    pub async fn progress(
        &self,
        task_id: &str,
        cache: &dyn ResultCache,
        cancel: &CancellationToken,
    ) -> AnalysisProgress {
        let request = HttpRequest::get(self.endpoint(&format!("progress/{task_id}")));

        match self.send_json(request, cancel).await {
            Ok(data) => {
                let mut progress = AnalysisProgress::from_value(&data);

                if progress.is_failed() {
                    warn!(task_id, "analysis task failed");
                    self.explain_failure(task_id, &mut progress, cancel).await;
                }

                cache.set_progress(task_id, &progress);
                progress
            }
            Err(Error::Auth { .. }) => AnalysisProgress::auth_expired(),
            Err(error) => {
                warn!(task_id, %error, "failed to fetch progress, using last known state");

                match cache.get_progress(task_id) {
                    Some(mut progress) => {
                        debug!(task_id, "progress cache hit");
                        progress.offline = true;
                        progress
                    }
                    None => AnalysisProgress::offline_estimate(),
                }
            }
        }
    }

    // the progress endpoint only says "failed", the results endpoint says why
    async fn explain_failure(
        &self,
        task_id: &str,
        progress: &mut AnalysisProgress,
        cancel: &CancellationToken,
    ) {
        let request = HttpRequest::get(self.endpoint(&format!("results/{task_id}")));

        match self.send_json(request, cancel).await {
            Ok(details) => {
                if let Some(reason) = details.get("error").and_then(Value::as_str) {
                    progress.message = Some(reason.to_string());
                    progress.error_details = Some(details.clone());
                }
            }
            Err(error) => debug!(task_id, %error, "no failure details available"),
        }

        let missing_model = progress
            .message
            .as_deref()
            .is_some_and(|message| MISSING_MODEL_MARKERS.iter().any(|m| message.contains(m)));

        if missing_model {
            progress.message = Some(MISSING_MODEL_HINT.to_string());
            progress.ai_model_error = true;
        }
    }

    /// Fetches and normalizes the results of `task_id`, without any fallback.
    pub async fn try_fetch_results(
        &self,
        task_id: &str,
        cancel: &CancellationToken,
    ) -> Result<NormalizedResult, Error> {
        let request = HttpRequest::get(self.endpoint(&format!("results/{task_id}")));
        let payload = self.send_json(request, cancel).await?;

        if let Some(path) = locate_ai_results(&payload) {
            info!(task_id, %path, "payload carries AI analysis");
        }

        Ok(normalize(&payload))
    }

    pub async fn fetch_analysis_results(
        &self,
        task_id: &str,
        cache: &dyn ResultCache,
        cancel: &CancellationToken,
    ) -> ResultsOutcome {
        let error = match self.try_fetch_results(task_id, cancel).await {
            Ok(result) => {
                cache.set_results(task_id, &result);
                return ResultsOutcome::Fresh(result);
            }
            Err(error) => error,
        };

        warn!(task_id, %error, "failed to fetch analysis results");

        if error.is_offline() {
            if let Some(cached) = cache.get_results(task_id) {
                info!(task_id, "serving last known results");
                return ResultsOutcome::Cached(cached);
            }
        }

        ResultsOutcome::Failed(FetchFailure::from(&error))
    }

    pub async fn history(&self, cancel: &CancellationToken) -> Result<Value, Error> {
        self.send_json(HttpRequest::get(self.endpoint("history")), cancel)
            .await
    }

    pub async fn cleanup(&self, cancel: &CancellationToken) -> Result<Value, Error> {
        self.send_json(HttpRequest::delete(self.endpoint("cleanup")), cancel)
            .await
    }
}

fn failure_message(response: &HttpResponse) -> String {
    let from_json = response.json().ok().and_then(|body| {
        ["message", "error"]
            .iter()
            .find_map(|key| body.get(*key)?.as_str().map(ToString::to_string))
    });

    from_json.unwrap_or_else(|| {
        let text = response.body.trim();
        if text.is_empty() {
            format!("status {}", response.status)
        } else {
            text.to_string()
        }
    })
}
