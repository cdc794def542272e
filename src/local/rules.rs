use miette::{Context as _, IntoDiagnostic as _};
use regex::Regex;

use crate::normalize::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Languages {
    All,
    Only(&'static [&'static str]),
}

impl Languages {
    pub fn includes(&self, language: &str) -> bool {
        match self {
            Languages::All => true,
            Languages::Only(languages) => languages.contains(&language),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Matcher {
    /// Regex tested against each line; the column is where the match starts.
    Line(Regex),
    /// Like `Line`, but lines also matching the second regex are exempt.
    LineUnless(Regex, Regex),
    /// Case-insensitive substrings tested against each line.
    Keywords(&'static [&'static str]),
    /// Regex tested once against the whole file.
    File(Regex),
    /// Fires once for a non-empty file without any comment marker.
    MissingComments,
}

/// A hit reported by a [`Matcher`]: 1-based line and column, plus the
/// offending source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub line: usize,
    pub column: usize,
    pub source: String,
}

pub const WHOLE_FILE: &str = "whole file";

impl Matcher {
    pub fn hits(&self, content: &str) -> Vec<Hit> {
        match self {
            Matcher::Line(pattern) => line_hits(content, |line| {
                pattern.find(line).map(|found| column_of(line, found.start()))
            }),
            Matcher::LineUnless(pattern, exempt) => line_hits(content, |line| {
                if exempt.is_match(line) {
                    return None;
                }
                pattern.find(line).map(|found| column_of(line, found.start()))
            }),
            Matcher::Keywords(keywords) => line_hits(content, |line| {
                let line = line.to_lowercase();
                keywords
                    .iter()
                    .any(|keyword| line.contains(&keyword.to_lowercase()))
                    .then_some(1)
            }),
            Matcher::File(pattern) => pattern
                .is_match(content)
                .then(whole_file_hit)
                .into_iter()
                .collect(),
            Matcher::MissingComments => {
                let commented = content.lines().any(|line| {
                    let line = line.trim_start();
                    line.starts_with('*')
                        || line.contains("//")
                        || line.contains("/*")
                        || line.contains('#')
                });

                (!content.trim().is_empty() && !commented)
                    .then(whole_file_hit)
                    .into_iter()
                    .collect()
            }
        }
    }
}

fn line_hits(content: &str, mut column: impl FnMut(&str) -> Option<usize>) -> Vec<Hit> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            column(line).map(|column| Hit {
                line: index + 1,
                column,
                source: line.trim().to_string(),
            })
        })
        .collect()
}

// regex offsets are bytes, columns are characters
fn column_of(line: &str, byte_offset: usize) -> usize {
    line[..byte_offset].chars().count() + 1
}

fn whole_file_hit() -> Hit {
    Hit {
        line: 1,
        column: 1,
        source: WHOLE_FILE.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    pub description: &'static str,
    pub languages: Languages,
    pub matcher: Matcher,
}

fn pattern(id: &str, source: &str) -> miette::Result<Regex> {
    Regex::new(source)
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid pattern for rule {id}"))
}

pub fn default_rules() -> miette::Result<Vec<Rule>> {
    Ok(vec![
        Rule {
            id: "security-1",
            severity: Severity::Critical,
            message: "potential SQL injection",
            description: "query text is built by concatenation, use parameterized queries",
            languages: Languages::Only(&["JavaScript", "Java", "PHP", "Python"]),
            matcher: Matcher::Line(pattern(
                "security-1",
                r#"(?i)(\w+\s*=\s*['"])\s*\+\s*\w+|\w+\.execute\(.*\+.*\)"#,
            )?),
        },
        Rule {
            id: "security-2",
            severity: Severity::Critical,
            message: "eval is a security risk",
            description: "eval can execute injected code, avoid it",
            languages: Languages::Only(&["JavaScript", "PHP", "Python"]),
            matcher: Matcher::Keywords(&["eval(", "eval ("]),
        },
        Rule {
            id: "security-3",
            severity: Severity::Critical,
            message: "hard-coded password or secret",
            description: "keep credentials out of source code",
            languages: Languages::All,
            matcher: Matcher::Line(pattern(
                "security-3",
                r#"(?i)(password|secret|key|token)\s*=\s*['"][^'"]+['"]"#,
            )?),
        },
        Rule {
            id: "performance-1",
            severity: Severity::Major,
            message: "possible memory leak",
            description: "an object is created but never assigned",
            languages: Languages::Only(&["JavaScript", "Java", "C++", "C#"]),
            matcher: Matcher::LineUnless(
                pattern("performance-1", r"(?i)\bnew\s+\w+\(.*\)")?,
                pattern("performance-1", r"(?i)(=|\breturn\b|\bthrow\b)\s*new\b")?,
            ),
        },
        Rule {
            id: "performance-2",
            severity: Severity::Major,
            message: "function created inside a loop",
            description: "creating functions in a loop costs an allocation per iteration",
            languages: Languages::Only(&["JavaScript"]),
            matcher: Matcher::Line(pattern(
                "performance-2",
                r"(?i)for\s*\(.*\)\s*\{[^}]*function",
            )?),
        },
        Rule {
            id: "quality-1",
            severity: Severity::Minor,
            message: "function is too long",
            description: "split long functions into smaller ones",
            languages: Languages::All,
            matcher: Matcher::File(pattern(
                "quality-1",
                r"(?is)(function|def|public|private)\s+\w+\s*\([^)]*\)\s*\{.{500,}?\}",
            )?),
        },
        Rule {
            id: "quality-2",
            severity: Severity::Minor,
            message: "variable name is not descriptive",
            description: "one or two letter names say nothing about the value",
            languages: Languages::All,
            matcher: Matcher::Line(pattern("quality-2", r"(?i)\b[a-z]{1,2}\b\s*=")?),
        },
        Rule {
            id: "quality-3",
            severity: Severity::Minor,
            message: "file has no comments",
            description: "add comments where the code is not self-explanatory",
            languages: Languages::All,
            matcher: Matcher::MissingComments,
        },
        Rule {
            id: "quality-4",
            severity: Severity::Major,
            message: "unfinished work marker",
            description: "TODO, FIXME and XXX markers point at unfinished work",
            languages: Languages::All,
            matcher: Matcher::Keywords(&["TODO", "FIXME", "XXX"]),
        },
        Rule {
            id: "quality-5",
            severity: Severity::Major,
            message: "code is nested too deeply",
            description: "deeply nested control flow is hard to follow, refactor it",
            languages: Languages::All,
            matcher: Matcher::Line(pattern(
                "quality-5",
                r"(?i)(if|for|while|switch)\s*\([^)]*\)\s*\{.*?(if|for|while|switch)\s*\([^)]*\)\s*\{.*?(if|for|while|switch)",
            )?),
        },
    ])
}
