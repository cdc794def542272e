use crate::local::is_local_result;
use crate::normalize::NormalizedResult;

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Short text report of a normalized result: score and totals first, then
/// one line per file.
pub fn render_summary(result: &NormalizedResult) -> String {
    let summary = &result.summary;

    let origin = if is_local_result(result) {
        " (local analysis)"
    } else {
        ""
    };

    let mut lines = vec![
        format!("Code quality score: {}/100{origin}", summary.code_quality_score),
        format!(
            "{}, {} (critical {}, major {}, minor {})",
            plural(summary.total_files, "file"),
            plural(summary.total_issues, "issue"),
            summary.critical_issues,
            summary.major_issues,
            summary.minor_issues
        ),
    ];

    lines.extend(result.file_results.iter().map(|file| {
        format!(
            "- {} ({}): score {}, {}",
            file.file_name,
            file.language,
            file.score,
            plural(file.issues.len(), "issue")
        )
    }));

    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{SourceFile, analyze_locally};
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn renders_totals_and_files() {
        let result = normalize(&json!({
            "results": {"codeQuality": {"issues": [
                {"message": "x", "severity": "critical", "fileName": "a.js"},
                {"message": "y", "severity": "minor", "fileName": "b.py"},
                {"message": "z", "severity": "minor", "fileName": "b.py"}
            ]}}
        }));

        insta::assert_snapshot!(render_summary(&result), @r"
        Code quality score: 92/100
        2 files, 3 issues (critical 1, major 0, minor 2)
        - a.js (JavaScript): score 85, 1 issue
        - b.py (Python): score 98, 2 issues
        ");
    }

    #[test]
    fn marks_local_results() {
        let result = analyze_locally(&[SourceFile::new("main.go", "// entry\n")])
            .expect("rules compile");

        insta::assert_snapshot!(render_summary(&result), @r"
        Code quality score: 100/100 (local analysis)
        1 file, 0 issues (critical 0, major 0, minor 0)
        - main.go (Go): score 100, 0 issues
        ");
    }
}
