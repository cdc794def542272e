use std::collections::HashMap;

use super::model::{FileResult, Issue};

pub const UNKNOWN_FILE: &str = "unknown file";
pub const UNKNOWN_LANGUAGE: &str = "unknown";

const LANGUAGES: &[(&str, &str)] = &[
    ("js", "JavaScript"),
    ("jsx", "JavaScript (React)"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript (React)"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("scss", "CSS (SCSS)"),
    ("less", "CSS (Less)"),
    ("py", "Python"),
    ("java", "Java"),
    ("go", "Go"),
    ("c", "C"),
    ("cpp", "C++"),
    ("h", "C/C++ Header"),
    ("hpp", "C++ Header"),
    ("cs", "C#"),
    ("php", "PHP"),
    ("rb", "Ruby"),
    ("vue", "Vue"),
    ("json", "JSON"),
    ("md", "Markdown"),
    ("sql", "SQL"),
    ("swift", "Swift"),
    ("kt", "Kotlin"),
    ("rs", "Rust"),
];

pub fn language_for(file_name: &str) -> &'static str {
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return UNKNOWN_LANGUAGE;
    };

    let extension = extension.to_ascii_lowercase();

    LANGUAGES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, language)| *language)
        .unwrap_or(UNKNOWN_LANGUAGE)
}

/// Buckets issues by exact file name. Buckets come out in the order their
/// file name was first seen; issues without a file name share one bucket.
pub fn group_by_file(issues: Vec<Issue>) -> Vec<FileResult> {
    let mut buckets: Vec<(String, Vec<Issue>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for issue in issues {
        let file_name = issue
            .file_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_FILE.to_string());

        match positions.get(&file_name) {
            Some(position) => buckets[*position].1.push(issue),
            None => {
                positions.insert(file_name.clone(), buckets.len());
                buckets.push((file_name, vec![issue]));
            }
        }
    }

    buckets
        .into_iter()
        .map(|(file_name, issues)| FileResult::from_issues(file_name, issues))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::model::IssueIds;
    use serde_json::json;

    #[test]
    fn language_comes_from_extension() {
        assert_eq!(language_for("src/a.JS"), "JavaScript");
        assert_eq!(language_for("main.rs"), "Rust");
        assert_eq!(language_for("Makefile"), UNKNOWN_LANGUAGE);
        assert_eq!(language_for("archive.tar.zst"), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn groups_keep_first_occurrence_order() {
        let mut ids = IssueIds::new();
        let issues = [
            json!({"message": "1", "severity": "minor", "fileName": "b.py"}),
            json!({"message": "2", "severity": "major", "fileName": "a.js"}),
            json!({"message": "3", "severity": "minor"}),
            json!({"message": "4", "severity": "critical", "fileName": "b.py"}),
        ]
        .iter()
        .filter_map(|value| Issue::from_value(value, &mut ids))
        .collect::<Vec<_>>();

        let files = group_by_file(issues);

        let names = files.iter().map(|f| f.file_name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["b.py", "a.js", UNKNOWN_FILE]);

        let messages = files[0]
            .issues
            .iter()
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>();
        assert_eq!(messages, vec!["1", "4"]);
        assert_eq!(files[0].score, 100 - 1 - 15);
        assert_eq!(files[0].language, "Python");
        assert_eq!(files[2].language, UNKNOWN_LANGUAGE);
    }

    #[test]
    fn empty_input_yields_no_files() {
        assert!(group_by_file(vec![]).is_empty());
    }
}
