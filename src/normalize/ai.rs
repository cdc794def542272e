use serde_json::Value;

use super::classify::has_field;

/// Returns the path of the first AI-produced section in a raw payload, if any.
pub fn locate_ai_results(payload: &Value) -> Option<String> {
    if let Some(key) = first_present(payload, &["aiResults", "aiAnalysis"]) {
        return Some(key.to_string());
    }

    if let Some(results) = payload.get("results").filter(|results| results.is_object()) {
        if let Some(key) = first_present(results, &["aiResults", "aiAnalysis"]) {
            return Some(format!("results.{key}"));
        }

        if results
            .get("codeQuality")
            .is_some_and(|quality| has_field(quality, "aiComments"))
        {
            return Some("results.codeQuality.aiComments".to_string());
        }
    }

    let files = payload.get("fileResults").and_then(Value::as_array)?;

    for (file_index, file) in files.iter().enumerate() {
        if let Some(key) = first_present(file, &["aiComments", "aiAnalysis"]) {
            return Some(format!("fileResults[{file_index}].{key}"));
        }

        let Some(issues) = file.get("issues").and_then(Value::as_array) else {
            continue;
        };

        for (issue_index, issue) in issues.iter().enumerate() {
            if let Some(key) = first_present(issue, &["aiSuggestion", "aiComment"]) {
                return Some(format!(
                    "fileResults[{file_index}].issues[{issue_index}].{key}"
                ));
            }
        }
    }

    None
}

fn first_present<'k>(value: &Value, keys: &[&'k str]) -> Option<&'k str> {
    keys.iter().copied().find(|key| has_field(value, key))
}
