use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use intake::config::Config;

/// A test context that provides an isolated temporary directory.
/// Tests can run in parallel because each has its own temp directory.
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    /// Returns the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Base command running intake in this temp directory, isolated from the
    /// caller's environment
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("intake").expect("Failed to find intake binary");
        cmd.args(args);
        cmd.current_dir(self.path());
        cmd.env_remove("INTAKE_API_BASE_URL");
        cmd.env_remove("INTAKE_TOKEN");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn run_intake(&self, args: &[&str]) -> CommandResult {
        self.collect(self.command(args))
    }

    pub fn run_intake_with_stdin(&self, args: &[&str], stdin: &str) -> CommandResult {
        let mut cmd = self.command(args);
        cmd.write_stdin(stdin.to_string());
        self.collect(cmd)
    }

    fn collect(&self, mut cmd: Command) -> CommandResult {
        let output = cmd.output().expect("Failed to execute intake command");

        CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }

    /// Get full path to a file in the temp directory
    pub fn file_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.path().join(path)
    }

    /// Write file to temp directory (creates parent directories)
    pub fn write_file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.file_path(&path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|_| panic!("Failed to create directory: {}", parent.display()));
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|_| panic!("Failed to write file: {}", full_path.display()));
    }

    /// Writes an intake.toml pointing at a backend that refuses connections,
    /// with a single attempt and the cache inside the temp directory
    pub fn write_offline_config(&self) {
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:1/api".to_string();
        config.retry.max_attempts = 1;
        config.retry.initial_delay_ms = 0;
        config.cache.dir = Some(self.file_path("cache"));

        config
            .save(&self.file_path("intake.toml"))
            .expect("Failed to save intake.toml");
    }

    pub fn stdout_json(&self, result: &CommandResult) -> serde_json::Value {
        serde_json::from_str(&result.stdout).unwrap_or_else(|error| {
            panic!("stdout is not JSON ({error}):\n{}", result.stdout)
        })
    }
}

pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

pub fn assert_success(result: &CommandResult) {
    assert!(
        result.success(),
        "Expected command to succeed but it failed.\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
        result.stdout,
        result.stderr
    );
}

pub fn assert_failure(result: &CommandResult) {
    assert!(
        !result.success(),
        "Expected command to fail but it succeeded.\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
        result.stdout,
        result.stderr
    );
}

pub fn assert_output_contains(result: &CommandResult, pattern: &str) {
    assert!(
        result.stdout.contains(pattern),
        "Expected stdout to contain '{}', but it didn't.\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
        pattern,
        result.stdout,
        result.stderr
    );
}

pub fn assert_stderr_contains(result: &CommandResult, pattern: &str) {
    assert!(
        result.stderr.contains(pattern),
        "Expected stderr to contain '{}', but it didn't.\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
        pattern,
        result.stdout,
        result.stderr
    );
}

mod edge_cases;
mod happy_path;
mod smoke;
