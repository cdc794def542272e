use super::*;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    let ctx = TestContext::new();

    ctx.command(&["--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("normalize").and(predicate::str::contains("scan")));
}

#[test]
fn version_runs_without_error() {
    let ctx = TestContext::new();
    let result = ctx.run_intake(&["--version"]);

    assert_success(&result);
    assert_output_contains(&result, "intake");
}

#[test]
fn scan_help_runs_without_error() {
    let ctx = TestContext::new();
    let result = ctx.run_intake(&["scan", "--help"]);

    assert_success(&result);
    assert_output_contains(&result, "built-in rules");
}
