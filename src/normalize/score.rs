use super::model::{FileResult, Issue, Severity};

pub const CRITICAL_PENALTY: i64 = 15;
pub const MAJOR_PENALTY: i64 = 5;
pub const MINOR_PENALTY: i64 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
    pub unclassified: usize,
}

impl SeverityCounts {
    pub fn tally<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut counts = SeverityCounts::default();

        for issue in issues {
            match issue.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Major => counts.major += 1,
                Severity::Minor => counts.minor += 1,
                Severity::Unclassified => counts.unclassified += 1,
            }
        }

        counts
    }

    pub fn total(&self) -> usize {
        self.critical + self.major + self.minor + self.unclassified
    }
}

/// Quality score of a set of issues: 100 minus 15 per critical, 5 per major
/// and 1 per minor issue, clamped to `0..=100`. Unclassified issues are free.
pub fn score_issues(issues: &[Issue]) -> u8 {
    let counts = SeverityCounts::tally(issues);

    let penalty = CRITICAL_PENALTY.saturating_mul(counts.critical as i64)
        + MAJOR_PENALTY.saturating_mul(counts.major as i64)
        + MINOR_PENALTY.saturating_mul(counts.minor as i64);

    (100 - penalty).clamp(0, 100) as u8
}

/// Rounded mean of the file scores, 0 when there are no files.
pub fn project_score(files: &[FileResult]) -> u8 {
    if files.is_empty() {
        return 0;
    }

    let total: f64 = files.iter().map(|file| f64::from(file.score)).sum();
    let mean = total / files.len() as f64;

    mean.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::model::IssueIds;
    use serde_json::json;

    fn issue(severity: &str, ids: &mut IssueIds) -> Issue {
        Issue::from_value(&json!({"message": "m", "severity": severity}), ids)
            .expect("object should parse")
    }

    #[test]
    fn empty_issue_list_scores_full_marks() {
        assert_eq!(score_issues(&[]), 100);
    }

    #[test]
    fn penalties_follow_severity_weights() {
        let mut ids = IssueIds::new();
        let issues = vec![
            issue("critical", &mut ids),
            issue("warning", &mut ids),
            issue("info", &mut ids),
            issue("whatever", &mut ids),
        ];

        assert_eq!(score_issues(&issues), 100 - 15 - 5 - 1);
    }

    #[test]
    fn score_is_clamped_at_zero() {
        let mut ids = IssueIds::new();
        let issues = (0..10).map(|_| issue("high", &mut ids)).collect::<Vec<_>>();

        assert_eq!(score_issues(&issues), 0);
    }

    #[test]
    fn adding_an_issue_never_raises_the_score() {
        let mut ids = IssueIds::new();
        let severities = ["critical", "major", "minor", "unknown", "error", "low"];
        let mut issues = Vec::new();
        let mut previous = score_issues(&issues);

        for round in 0..40 {
            issues.push(issue(severities[round % severities.len()], &mut ids));
            let current = score_issues(&issues);

            assert!(current <= previous, "score rose from {previous} to {current}");
            assert!(current <= 100);
            previous = current;
        }
    }

    #[test]
    fn project_score_is_rounded_mean() {
        let mut files = vec![
            FileResult::from_issues("a.js", vec![]),
            FileResult::from_issues("b.js", vec![]),
        ];
        files[0].score = 85;
        files[1].score = 90;

        assert_eq!(project_score(&files), 88);
        assert_eq!(project_score(&[]), 0);
    }
}
