use super::*;

#[test]
fn unknown_payload_is_kept_as_data() {
    let ctx = TestContext::new();
    ctx.write_file("scalar.json", "42");

    let result = ctx.run_intake(&["normalize", "scalar.json"]);

    assert_success(&result);
    let normalized = ctx.stdout_json(&result);
    assert_eq!(normalized["results"]["unknownFormat"], true);
    assert_eq!(normalized["summary"]["totalIssues"], 0);
}

#[test]
fn missing_input_file_fails() {
    let ctx = TestContext::new();

    let result = ctx.run_intake(&["normalize", "missing.json"]);

    assert_failure(&result);
    assert_stderr_contains(&result, "missing.json");
}

#[test]
fn invalid_json_fails() {
    let ctx = TestContext::new();
    ctx.write_file("broken.json", "{not json");

    let result = ctx.run_intake(&["classify", "broken.json"]);

    assert_failure(&result);
    assert_stderr_contains(&result, "not valid JSON");
}

#[test]
fn invalid_config_is_reported() {
    let ctx = TestContext::new();
    ctx.write_file("intake.toml", "[retry]\nmax_attempts = \"many\"\n");
    ctx.write_file("payload.json", "{}");

    let result = ctx.run_intake(&["normalize", "payload.json"]);

    assert_failure(&result);
    assert_stderr_contains(&result, "invalid config");
}

#[test]
fn explicit_missing_config_fails() {
    let ctx = TestContext::new();
    ctx.write_file("payload.json", "{}");

    let result = ctx.run_intake(&["--config", "nope.toml", "normalize", "payload.json"]);

    assert_failure(&result);
}

#[test]
fn fetch_without_backend_or_cache_fails() {
    let ctx = TestContext::new();
    ctx.write_offline_config();

    let result = ctx.run_intake(&["fetch", "t1"]);

    assert_failure(&result);
    assert_eq!(ctx.stdout_json(&result)["error"], true);
    assert_stderr_contains(&result, "intake scan");
}

#[test]
fn progress_without_backend_is_estimated() {
    let ctx = TestContext::new();
    ctx.write_offline_config();

    let result = ctx.run_intake(&["progress", "t1"]);

    assert_success(&result);
    let progress = ctx.stdout_json(&result);
    assert_eq!(progress["status"], "processing");
    assert_eq!(progress["progress"], 30);
    assert_eq!(progress["offline"], true);
}

#[test]
fn scan_requires_a_path() {
    let ctx = TestContext::new();

    let result = ctx.run_intake(&["scan"]);

    assert_failure(&result);
}
