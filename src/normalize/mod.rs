//! Turns whatever the analysis backend answered with into a
//! [`NormalizedResult`].
//!
//! Normalization is total: unrecognized shapes are recorded as data inside
//! `results` (`unknownFormat`, `rawArray`, placeholder files) rather than
//! reported as errors.

mod ai;
mod classify;
mod extract;
mod group;
mod model;
mod score;

use serde_json::Value;
use tracing::debug;

pub use ai::locate_ai_results;
pub use classify::{Envelope, PayloadFormat, classify};
pub use extract::{MAX_DEPTH, MAX_RECORDS, extract_issues};
pub use group::{UNKNOWN_FILE, UNKNOWN_LANGUAGE, group_by_file, language_for};
pub use model::{FileResult, Issue, IssueIds, NormalizedResult, Severity, Summary, UNNAMED_FILE};
pub use score::{SeverityCounts, project_score, score_issues};

pub const SYNTHESIZED_FILE: &str = "synthesized result";
pub const PLACEHOLDER_FILE: &str = "no file results";

pub fn normalize(payload: &Value) -> NormalizedResult {
    let format = classify(payload);
    debug!(%format, "classified analysis payload");

    let envelope = Envelope::open(format, payload);
    let mut ids = IssueIds::new();

    let mut file_results = envelope
        .file_results
        .iter()
        .filter_map(|raw| FileResult::from_value(raw, &mut ids))
        .collect::<Vec<FileResult>>();

    if file_results.is_empty() {
        if let Some(issues) = envelope
            .results
            .pointer("/codeQuality/issues")
            .and_then(Value::as_array)
        {
            let issues = issues
                .iter()
                .filter_map(|raw| Issue::from_value(raw, &mut ids))
                .collect();

            file_results = group_by_file(issues);
        }
    }

    if file_results.is_empty() {
        file_results.push(synthesize_file(&envelope.results, &mut ids));
    }

    let summary = Summary::compute(&file_results, envelope.summary);

    NormalizedResult {
        results: envelope.results,
        file_results,
        summary,
    }
}

// used when the backend gave no per-file breakdown at all
fn synthesize_file(results: &Value, ids: &mut IssueIds) -> FileResult {
    let issues = extract_issues(results)
        .into_iter()
        .filter_map(|raw| Issue::from_value(raw, ids))
        .collect::<Vec<Issue>>();

    if issues.is_empty() {
        debug!("no issues found, emitting placeholder file");
        return FileResult {
            file_name: PLACEHOLDER_FILE.to_string(),
            language: UNKNOWN_LANGUAGE.to_string(),
            issues,
            score: score_issues(&[]),
        };
    }

    debug!(count = issues.len(), "synthesized file from extracted issues");

    FileResult {
        file_name: SYNTHESIZED_FILE.to_string(),
        language: UNKNOWN_LANGUAGE.to_string(),
        score: score_issues(&issues),
        issues,
    }
}
