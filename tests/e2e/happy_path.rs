use super::*;
use predicates::prelude::*;

#[test]
fn normalize_groups_code_quality_issues() {
    let ctx = TestContext::new();
    ctx.write_file(
        "payload.json",
        r#"{"results":{"codeQuality":{"issues":[{"message":"x","severity":"critical","fileName":"a.js"}]}}}"#,
    );

    let result = ctx.run_intake(&["normalize", "payload.json"]);

    assert_success(&result);
    let normalized = ctx.stdout_json(&result);
    assert_eq!(normalized["fileResults"][0]["fileName"], "a.js");
    assert_eq!(normalized["fileResults"][0]["language"], "JavaScript");
    assert_eq!(normalized["fileResults"][0]["score"], 85);
    assert_eq!(normalized["summary"]["criticalIssues"], 1);
    assert_eq!(normalized["summary"]["codeQualityScore"], 85);
}

#[test]
fn normalize_reads_stdin() {
    let ctx = TestContext::new();

    let result = ctx.run_intake_with_stdin(
        &["normalize", "-"],
        r#"{"code":200,"data":{"results":{"security":[]}}}"#,
    );

    assert_success(&result);
    let normalized = ctx.stdout_json(&result);
    assert_eq!(normalized["results"], serde_json::json!({"security": []}));
}

#[test]
fn normalize_renders_summary() {
    let ctx = TestContext::new();
    ctx.write_file("payload.json", "[]");

    ctx.command(&["normalize", "payload.json", "--format", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Code quality score: 100/100"))
        .stdout(predicate::str::contains("- no file results (unknown): score 100, 0 issues"));
}

#[test]
fn classify_reports_format() {
    let ctx = TestContext::new();
    ctx.write_file("wrapped.json", r#"{"code":200,"data":{"results":{}}}"#);

    let result = ctx.run_intake(&["classify", "wrapped.json"]);

    assert_success(&result);
    assert_eq!(result.stdout.trim(), "api-wrapped");
}

#[test]
fn scan_reports_local_findings() {
    let ctx = TestContext::new();
    ctx.write_file("src/app.js", "// entry\nconst result = eval(input);\n");
    ctx.write_file("src/util.py", "# helpers\nprint('ok')\n");

    let result = ctx.run_intake(&["scan", "src"]);

    assert_success(&result);
    assert_output_contains(&result, "(local analysis)");
    assert_output_contains(&result, "app.js (JavaScript): score 85, 1 issue");
    assert_output_contains(&result, "util.py (Python): score 100, 0 issues");
}

#[test]
fn fetch_serves_cached_results_when_backend_is_down() {
    let ctx = TestContext::new();
    ctx.write_offline_config();

    let cached = intake::normalize::normalize(&serde_json::json!({
        "fileResults": [{"fileName": "a.js", "issues": []}]
    }));
    ctx.write_file(
        "cache/results_t1.json",
        &serde_json::to_string(&cached).expect("serialize"),
    );

    let result = ctx.run_intake(&["fetch", "t1"]);

    assert_success(&result);
    assert_stderr_contains(&result, "last known results");
    assert_eq!(ctx.stdout_json(&result)["fileResults"][0]["fileName"], "a.js");
}
