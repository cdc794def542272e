use serde_json::Value;
use tracing::{debug, warn};

use super::classify::has_field;

pub const MAX_DEPTH: usize = 64;
pub const MAX_RECORDS: usize = 10_000;

/// Collects issue-like records from anywhere inside `node`, depth first and in
/// document order.
///
/// An array whose first element looks like an issue is taken whole and not
/// descended into. An object with a `message` and a `severity` or `level` is
/// taken as a single issue. Subtrees deeper than [`MAX_DEPTH`] are skipped and
/// collection stops after [`MAX_RECORDS`] records.
pub fn extract_issues(node: &Value) -> Vec<&Value> {
    let mut found = Vec::new();
    walk(node, "", 0, &mut found);
    found
}

fn walk<'a>(node: &'a Value, path: &str, depth: usize, found: &mut Vec<&'a Value>) {
    if found.len() >= MAX_RECORDS {
        return;
    }

    if depth > MAX_DEPTH {
        debug!(path, "skipping subtree beyond extraction depth limit");
        return;
    }

    match node {
        Value::Array(items) => {
            if items.first().is_some_and(looks_like_issue_record) {
                debug!(path, count = items.len(), "found issue array");
                push_bounded(found, items.iter());
                return;
            }

            for (index, item) in items.iter().enumerate() {
                walk(item, &format!("{path}[{index}]"), depth + 1, found);
            }
        }
        Value::Object(record) => {
            if looks_like_single_issue(node) {
                push_bounded(found, std::iter::once(node));
                return;
            }

            for (key, value) in record {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };

                walk(value, &child, depth + 1, found);
            }
        }
        _ => {}
    }
}

fn push_bounded<'a>(found: &mut Vec<&'a Value>, records: impl Iterator<Item = &'a Value>) {
    for record in records {
        if found.len() >= MAX_RECORDS {
            warn!(limit = MAX_RECORDS, "issue extraction truncated");
            return;
        }

        found.push(record);
    }
}

fn looks_like_issue_record(value: &Value) -> bool {
    value.is_object()
        && (has_field(value, "message") || has_field(value, "severity") || has_field(value, "rule"))
}

fn looks_like_single_issue(value: &Value) -> bool {
    has_field(value, "message") && (has_field(value, "severity") || has_field(value, "level"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_nested_issue_arrays_in_document_order() {
        let payload = json!({
            "security": {"findings": [{"rule": "s1"}, {"rule": "s2"}]},
            "performance": [{"group": {"message": "slow", "level": "warning"}}],
            "meta": {"version": 3, "tags": ["a", "b"]}
        });

        let found = extract_issues(&payload);

        assert_eq!(found.len(), 3);
        assert_eq!(found[0]["rule"], json!("s1"));
        assert_eq!(found[1]["rule"], json!("s2"));
        assert_eq!(found[2]["message"], json!("slow"));
    }

    #[test]
    fn issue_array_is_taken_whole() {
        let payload = json!([{"severity": "high"}, {"unrelated": true}, 7]);

        let found = extract_issues(&payload);

        assert_eq!(found.len(), 3);
    }

    #[test]
    fn message_without_severity_is_not_an_issue() {
        let payload = json!({"message": "server returned a result without details"});

        assert!(extract_issues(&payload).is_empty());
    }

    #[test]
    fn scalars_contribute_nothing() {
        assert!(extract_issues(&json!(null)).is_empty());
        assert!(extract_issues(&json!("text")).is_empty());
        assert!(extract_issues(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let payload = json!({"a": [{"message": "x"}], "b": {"message": "y", "severity": "low"}});

        assert_eq!(extract_issues(&payload), extract_issues(&payload));
    }

    #[test]
    fn deep_nesting_is_cut_off() {
        let mut payload = json!({"message": "deep", "severity": "critical"});
        for _ in 0..(MAX_DEPTH + 10) {
            payload = json!({ "next": payload });
        }

        assert!(extract_issues(&payload).is_empty());

        let mut shallow = json!({"message": "near", "severity": "critical"});
        for _ in 0..10 {
            shallow = json!({ "next": shallow });
        }

        assert_eq!(extract_issues(&shallow).len(), 1);
    }

    #[test]
    fn collection_stops_at_record_limit() {
        let issues = (0..MAX_RECORDS + 5)
            .map(|i| json!({"message": format!("m{i}")}))
            .collect::<Vec<_>>();
        let payload = json!({"first": issues, "second": [{"message": "late"}]});

        assert_eq!(extract_issues(&payload).len(), MAX_RECORDS);
    }
}
