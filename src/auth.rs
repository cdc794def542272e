//! Source of the bearer token for backend requests. Token issuance lives
//! elsewhere; this only reads whatever token is current.

use tracing::warn;

use crate::error::BoxError;

pub const LOCAL_MODE_HEADER: &str = "X-Analysis-Mode";

pub trait AuthProvider: Send + Sync {
    /// `Ok(None)` means no token is available and requests run in local mode.
    fn token(&self) -> Result<Option<String>, BoxError>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl AuthProvider for StaticToken {
    fn token(&self) -> Result<Option<String>, BoxError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
pub struct EnvToken {
    pub var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl AuthProvider for EnvToken {
    fn token(&self) -> Result<Option<String>, BoxError> {
        match std::env::var(&self.var) {
            Ok(token) if token.trim().is_empty() => Ok(None),
            Ok(token) => Ok(Some(token.trim().to_string())),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(error) => Err(Box::new(error)),
        }
    }
}

/// Headers to attach to a backend request. Without a token the backend is
/// told to run in local mode; a failing provider is reported as well so the
/// backend can decide how to treat the request.
pub fn auth_headers(provider: &dyn AuthProvider) -> Vec<(String, String)> {
    match provider.token() {
        Ok(Some(token)) => vec![("Authorization".to_string(), format!("Bearer {token}"))],
        Ok(None) => vec![(LOCAL_MODE_HEADER.to_string(), "local".to_string())],
        Err(error) => {
            warn!(%error, "failed to read auth token, continuing in local mode");
            vec![
                (LOCAL_MODE_HEADER.to_string(), "local".to_string()),
                ("X-Error".to_string(), "auth_failed".to_string()),
            ]
        }
    }
}
