use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::normalize::NormalizedResult;

const PROGRESS_KEYS: &[&str] = &["status", "progress", "message", "offline"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisProgress {
    pub status: String,

    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub offline: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ai_model_error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisProgress {
    pub fn from_value(value: &Value) -> Self {
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let progress = value
            .get("progress")
            .and_then(Value::as_f64)
            .map(|progress| progress.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);

        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let offline = value
            .get("offline")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let extra = value
            .as_object()
            .map(|record| {
                record
                    .iter()
                    .filter(|(key, _)| !PROGRESS_KEYS.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            status,
            progress,
            message,
            offline,
            ai_model_error: false,
            error_details: None,
            extra,
        }
    }

    pub fn auth_expired() -> Self {
        Self::offline_status("auth_error", 0, "authentication expired, sign in again")
    }

    /// Stand-in reported while the backend is unreachable and nothing is cached.
    pub fn offline_estimate() -> Self {
        Self::offline_status(
            "processing",
            30,
            "analyzing locally, the analysis backend is unreachable",
        )
    }

    fn offline_status(status: &str, progress: u8, message: &str) -> Self {
        Self {
            status: status.to_string(),
            progress,
            message: Some(message.to_string()),
            offline: true,
            ai_model_error: false,
            error_details: None,
            extra: Map::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    File,
    Project,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub task_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub offline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub rule_ids: Vec<String>,
    pub ai_model_id: String,
    pub is_project: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl StartRequest {
    pub fn new(rule_ids: Vec<String>) -> Self {
        Self {
            rule_ids,
            ..Default::default()
        }
    }

    /// The backend only resolves models by object id; anything else is sent
    /// empty so the backend falls back to its default model.
    pub fn with_ai_model(mut self, model_id: &str) -> Self {
        self.ai_model_id = if is_object_id(model_id) {
            model_id.to_string()
        } else {
            String::new()
        };
        self
    }

    pub fn for_project(mut self, project_name: impl Into<String>) -> Self {
        self.is_project = true;
        self.project_name = Some(project_name.into());
        self
    }
}

fn is_object_id(value: &str) -> bool {
    value.len() == 24 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// What `fetch_analysis_results` hands back. Serialized untagged, so a
/// failure renders as `{error: true, status, message}` and a result as the
/// normalized result itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultsOutcome {
    Fresh(NormalizedResult),
    Cached(NormalizedResult),
    Failed(FetchFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl From<&Error> for FetchFailure {
    fn from(error: &Error) -> Self {
        let message = match error {
            Error::Auth { .. } => "authentication expired, sign in again".to_string(),
            Error::Status { message, .. } => {
                format!("failed to fetch analysis results: {message}")
            }
            other => format!("failed to fetch analysis results: {other}"),
        };

        Self {
            error: true,
            status: error.status(),
            message,
        }
    }
}
