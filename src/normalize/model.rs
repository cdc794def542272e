use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::group::language_for;
use super::score::{SeverityCounts, project_score, score_issues};

pub const UNNAMED_FILE: &str = "unnamed file";

// owned by the issue's own fields, so never carried in `extra`
const CANONICAL_KEYS: &[&str] = &[
    "id",
    "ruleId",
    "severity",
    "message",
    "lineNumber",
    "column",
    "source",
    "fileName",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    #[default]
    Unclassified,
}

impl Severity {
    /// Maps the several severity vocabularies used by the backend pipelines
    /// onto the canonical four levels.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" | "high" | "error" => Severity::Critical,
            "major" | "medium" | "warning" => Severity::Major,
            "minor" | "low" | "info" => Severity::Minor,
            _ => Severity::Unclassified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Unclassified => "unclassified",
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        Severity::from_label(&value)
    }
}

/// Hands out synthetic issue ids. One generator lives for exactly one
/// normalization, which is the scope ids are unique in.
#[derive(Debug)]
pub struct IssueIds {
    stamp: i64,
    next: usize,
}

impl IssueIds {
    pub fn new() -> Self {
        Self {
            stamp: chrono::Utc::now().timestamp_millis(),
            next: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.next += 1;
        format!("issue-{}-{}", self.stamp, self.next)
    }
}

impl Default for IssueIds {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Backend fields with no canonical counterpart, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    /// Builds an issue from a loosely shaped backend record. Returns `None` for
    /// anything that is not a JSON object.
    pub fn from_value(value: &Value, ids: &mut IssueIds) -> Option<Issue> {
        let mut fields = RecordFields::new(value.as_object()?);

        let id = fields.text(&["id"]).unwrap_or_else(|| ids.next_id());

        let severity = fields
            .text(&["severity", "level"])
            .map(|label| Severity::from_label(&label))
            .unwrap_or_default();

        let message = fields
            .text(&["message", "title"])
            .or_else(|| fields.rendered("message"))
            .unwrap_or_default();

        Some(Issue {
            id,
            rule_id: fields.text(&["ruleId", "rule_id", "rule"]),
            severity,
            message,
            line_number: fields.number(&["lineNumber", "line"]),
            column: fields.number(&["column", "col"]),
            source: fields.text(&["source"]),
            file_name: fields.text(&["fileName", "file"]),
            extra: fields.rest(),
        })
    }
}

/// Reads canonical fields out of a backend record, remembering which alias
/// supplied each one. Aliases that lost or did not parse stay in the rest.
struct RecordFields<'a> {
    record: &'a Map<String, Value>,
    used: Vec<&'static str>,
}

impl<'a> RecordFields<'a> {
    fn new(record: &'a Map<String, Value>) -> Self {
        Self {
            record,
            used: Vec::new(),
        }
    }

    /// First key holding a non-blank string or a number.
    fn text(&mut self, keys: &[&'static str]) -> Option<String> {
        let (key, text) = keys.iter().find_map(|key| match self.record.get(*key)? {
            Value::String(text) if !text.trim().is_empty() => Some((*key, text.clone())),
            Value::Number(number) => Some((*key, number.to_string())),
            _ => None,
        })?;

        self.used.push(key);
        Some(text)
    }

    // line numbers show up as numbers or numeric strings depending on the pipeline
    fn number(&mut self, keys: &[&'static str]) -> Option<usize> {
        let (key, number) = keys.iter().find_map(|key| {
            let entry = self.record.get(*key)?;

            let number = match entry.as_u64() {
                Some(number) => usize::try_from(number).ok(),
                None => entry
                    .as_str()
                    .and_then(|text| text.trim().parse::<usize>().ok()),
            };

            number.map(|number| (*key, number))
        })?;

        self.used.push(key);
        Some(number)
    }

    /// Structured values rendered as compact JSON text.
    fn rendered(&mut self, key: &'static str) -> Option<String> {
        let value = self
            .record
            .get(key)
            .filter(|value| !value.is_null() && !value.is_string())?;

        self.used.push(key);
        Some(value.to_string())
    }

    fn rest(self) -> Map<String, Value> {
        self.record
            .iter()
            .filter(|(key, _)| {
                !CANONICAL_KEYS.contains(&key.as_str()) && !self.used.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

fn score_value(value: Option<&Value>) -> Option<u8> {
    let score = value?.as_f64()?;
    Some(score.round().clamp(0.0, 100.0) as u8)
}

fn count_value(value: Option<&Value>) -> Option<usize> {
    let count = value?.as_f64()?;
    (count > 0.0).then(|| count.round() as usize)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub file_name: String,
    pub language: String,
    pub issues: Vec<Issue>,
    pub score: u8,
}

impl FileResult {
    /// Builds a file result from scored issues, inferring the language from
    /// the file name.
    pub fn from_issues(file_name: impl Into<String>, issues: Vec<Issue>) -> Self {
        let file_name = file_name.into();

        FileResult {
            language: language_for(&file_name).to_string(),
            score: score_issues(&issues),
            file_name,
            issues,
        }
    }

    /// Takes a backend-supplied file record, filling in whatever it left out.
    pub fn from_value(value: &Value, ids: &mut IssueIds) -> Option<FileResult> {
        let record = value.as_object()?;

        let file_name = record
            .get("fileName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNNAMED_FILE)
            .to_string();

        let issues = record
            .get("issues")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| Issue::from_value(item, ids))
                    .collect::<Vec<Issue>>()
            })
            .unwrap_or_default();

        let score = score_value(record.get("score")).unwrap_or_else(|| score_issues(&issues));

        let language = record
            .get("language")
            .and_then(Value::as_str)
            .filter(|language| !language.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| language_for(&file_name).to_string());

        Some(FileResult {
            file_name,
            language,
            issues,
            score,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_files: usize,
    pub total_issues: usize,
    pub critical_issues: usize,
    pub major_issues: usize,
    pub minor_issues: usize,
    pub code_quality_score: u8,
}

impl Summary {
    /// Recomputes the summary from the file results. Issue counts are always
    /// derived locally; the file total and the project score are taken from the
    /// backend summary when it carries a non-zero value for them.
    pub fn compute(files: &[FileResult], backend: Option<&Value>) -> Summary {
        let counts = SeverityCounts::tally(files.iter().flat_map(|file| file.issues.iter()));

        let total_files = backend
            .and_then(|summary| count_value(summary.get("totalFiles")))
            .unwrap_or(files.len());

        let code_quality_score = backend
            .and_then(|summary| score_value(summary.get("codeQualityScore")))
            .filter(|score| *score > 0)
            .unwrap_or_else(|| project_score(files));

        Summary {
            total_files,
            total_issues: counts.total(),
            critical_issues: counts.critical,
            major_issues: counts.major,
            minor_issues: counts.minor,
            code_quality_score,
        }
    }
}

/// The canonical shape every caller renders, whatever envelope the backend
/// answered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub results: Value,
    pub file_results: Vec<FileResult>,
    pub summary: Summary,
}
