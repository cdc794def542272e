//! Rule-based analysis that runs without the backend.
//!
//! Used when the backend rejects the session or cannot be reached. Each
//! source file is checked against the built-in [`Rule`]s for its language and
//! the findings go through the same normalizer as a backend payload; only
//! `results.localAnalysis` tells the two apart.

mod rules;

use std::path::{Path, PathBuf};

use miette::{Context as _, IntoDiagnostic as _};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

pub use rules::{Hit, Languages, Matcher, Rule, WHOLE_FILE, default_rules};

use crate::normalize::{
    FileResult, Issue, IssueIds, NormalizedResult, UNKNOWN_LANGUAGE, language_for, normalize,
};

const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "dist", "build"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn read(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;

        Ok(Self::new(path.display().to_string(), content))
    }

    pub fn language(&self) -> &'static str {
        language_for(&self.name)
    }
}

/// Expands `paths` into the source files to scan. Directories are walked
/// recursively, skipping hidden entries and dependency/build folders; files
/// of unknown language are left out.
pub fn collect_sources(paths: &[PathBuf]) -> miette::Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            walk(path, &mut files)?;
        } else {
            files.push(SourceFile::read(path)?);
        }
    }

    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<SourceFile>) -> miette::Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to list {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()?;

    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
            continue;
        }

        if path.is_dir() {
            walk(&path, files)?;
        } else if language_for(&name) != UNKNOWN_LANGUAGE {
            files.push(SourceFile::read(&path)?);
        }
    }

    Ok(())
}

pub struct LocalAnalyzer {
    rules: Vec<Rule>,
}

impl LocalAnalyzer {
    pub fn new() -> miette::Result<Self> {
        Ok(Self::with_rules(default_rules()?))
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    fn check(&self, file: &SourceFile, language: &str, ids: &mut IssueIds) -> Vec<Issue> {
        self.rules
            .iter()
            .filter(|rule| rule.languages.includes(language))
            .flat_map(|rule| {
                rule.matcher
                    .hits(&file.content)
                    .into_iter()
                    .map(move |hit| (rule, hit))
            })
            .map(|(rule, hit)| {
                let mut extra = Map::new();
                extra.insert("description".to_string(), json!(rule.description));

                Issue {
                    id: ids.next_id(),
                    rule_id: Some(rule.id.to_string()),
                    severity: rule.severity,
                    message: rule.message.to_string(),
                    line_number: Some(hit.line),
                    column: Some(hit.column),
                    source: Some(hit.source),
                    file_name: Some(file.name.clone()),
                    extra,
                }
            })
            .collect()
    }

    /// `summary.totalFiles` counts every input file, skipped ones included.
    pub fn analyze(&self, files: &[SourceFile]) -> NormalizedResult {
        let mut ids = IssueIds::new();
        let mut file_results = Vec::new();

        for file in files {
            let language = file.language();
            if language == UNKNOWN_LANGUAGE {
                debug!(file = %file.name, "skipping file of unknown language");
                continue;
            }

            let issues = self.check(file, language, &mut ids);
            debug!(file = %file.name, language, issues = issues.len(), "file analyzed");

            file_results.push(FileResult::from_issues(file.name.clone(), issues));
        }

        let payload = json!({
            "results": {
                "localAnalysis": true,
                "rulesApplied": self.rules.len(),
            },
            "fileResults": file_results,
            "summary": {"totalFiles": files.len()},
        });

        let result = normalize(&payload);
        info!(
            files = result.summary.total_files,
            issues = result.summary.total_issues,
            score = result.summary.code_quality_score,
            "local analysis finished"
        );

        result
    }
}

pub fn analyze_locally(files: &[SourceFile]) -> miette::Result<NormalizedResult> {
    Ok(LocalAnalyzer::new()?.analyze(files))
}

pub fn is_local_result(result: &NormalizedResult) -> bool {
    result
        .results
        .get("localAnalysis")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
