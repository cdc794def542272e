use std::fmt::Display;

use serde::Serialize;
use serde_json::{Map, Value, json};

const MESSAGE_ONLY_PLACEHOLDER: &str = "the server returned a result without details";

/// Envelope shapes the analysis backend is known to answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PayloadFormat {
    /// `{results, fileResults?, summary?}`
    Enveloped,
    /// `{code, data | message}`
    ApiWrapped,
    /// `{codeQuality | security | performance, ...}`
    DirectAnalysis,
    /// `{fileResults: [...]}` or an array of file records
    FileArray,
    /// An array of issue records
    IssueArray,
    /// Any other array, including the empty one
    RawArray,
    Unknown,
}

impl PayloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFormat::Enveloped => "enveloped",
            PayloadFormat::ApiWrapped => "api-wrapped",
            PayloadFormat::DirectAnalysis => "direct-analysis",
            PayloadFormat::FileArray => "file-array",
            PayloadFormat::IssueArray => "issue-array",
            PayloadFormat::RawArray => "raw-array",
            PayloadFormat::Unknown => "unknown",
        }
    }
}

impl Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loose truthiness: null, false, 0 and "" count as absent.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn has_field(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(truthy)
}

/// Decides which envelope `payload` is in. Checks run in priority order and
/// the first match wins, since a payload can satisfy more than one shape.
pub fn classify(payload: &Value) -> PayloadFormat {
    if has_field(payload, "results") {
        return PayloadFormat::Enveloped;
    }

    if payload.get("code").is_some() && (has_field(payload, "data") || has_field(payload, "message"))
    {
        return PayloadFormat::ApiWrapped;
    }

    if ["codeQuality", "security", "performance"]
        .iter()
        .any(|key| has_field(payload, key))
    {
        return PayloadFormat::DirectAnalysis;
    }

    if payload.get("fileResults").is_some_and(Value::is_array) {
        return PayloadFormat::FileArray;
    }

    if let Some(items) = payload.as_array() {
        return match items.first() {
            Some(first) if first.is_object() && (has_field(first, "fileName") || has_field(first, "issues")) => {
                PayloadFormat::FileArray
            }
            Some(first) if first.is_object() && (has_field(first, "message") || has_field(first, "severity")) => {
                PayloadFormat::IssueArray
            }
            _ => PayloadFormat::RawArray,
        };
    }

    PayloadFormat::Unknown
}

/// What a classified payload contributes before any synthesis happens.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<'a> {
    pub results: Value,
    pub file_results: &'a [Value],
    pub summary: Option<&'a Value>,
}

impl<'a> Envelope<'a> {
    pub fn open(format: PayloadFormat, payload: &'a Value) -> Self {
        match format {
            PayloadFormat::Enveloped => Envelope {
                results: payload.get("results").cloned().unwrap_or(Value::Null),
                file_results: file_results_of(payload),
                summary: summary_of(payload),
            },
            PayloadFormat::ApiWrapped => match payload.get("data").filter(|data| data.is_object()) {
                Some(data) => {
                    let results = ["results", "analysis"]
                        .iter()
                        .find_map(|key| data.get(*key).filter(|value| truthy(value)))
                        .unwrap_or(data)
                        .clone();

                    Envelope {
                        results,
                        file_results: file_results_of(data),
                        summary: summary_of(data),
                    }
                }
                None => {
                    let message = payload
                        .get("message")
                        .filter(|message| truthy(message))
                        .cloned()
                        .unwrap_or_else(|| json!(MESSAGE_ONLY_PLACEHOLDER));

                    Envelope::results_only(json!({ "message": message }))
                }
            },
            PayloadFormat::DirectAnalysis => Envelope {
                results: payload.clone(),
                file_results: file_results_of(payload),
                summary: summary_of(payload),
            },
            PayloadFormat::FileArray => match payload.as_array() {
                Some(items) => Envelope {
                    results: json!({ "arrayOfFiles": true }),
                    file_results: items,
                    summary: None,
                },
                None => Envelope {
                    results: json!({ "onlyFileResults": true }),
                    file_results: file_results_of(payload),
                    summary: None,
                },
            },
            PayloadFormat::IssueArray => {
                Envelope::results_only(json!({ "codeQuality": { "issues": payload.clone() } }))
            }
            PayloadFormat::RawArray => Envelope::results_only(json!({ "rawArray": payload.clone() })),
            PayloadFormat::Unknown => {
                let mut wrapped = match payload {
                    Value::Object(record) => record.clone(),
                    other => Map::from_iter([("value".to_string(), other.clone())]),
                };

                wrapped.insert("unknownFormat".to_string(), Value::Bool(true));

                Envelope::results_only(Value::Object(wrapped))
            }
        }
    }

    fn results_only(results: Value) -> Self {
        Envelope {
            results,
            file_results: &[],
            summary: None,
        }
    }
}

fn file_results_of(value: &Value) -> &[Value] {
    value
        .get("fileResults")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn summary_of(value: &Value) -> Option<&Value> {
    value.get("summary").filter(|summary| summary.is_object())
}
