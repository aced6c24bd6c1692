//! JsonDB E2E tests
//!
//! Drive the compiled binary against a scratch database file

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

// ============== Harness ==============

/// Output of one CLI invocation
#[derive(Debug)]
pub struct CliResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// JsonDB CLI wrapper
pub struct JsonDbCli {
    bin: PathBuf,
    db: PathBuf,
    _dir: TempDir,
}

impl JsonDbCli {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        Self {
            bin: PathBuf::from(env!("CARGO_BIN_EXE_jsondb")),
            db: dir.path().join("db.json"),
            _dir: dir,
        }
    }

    pub fn db(&self) -> &Path {
        &self.db
    }

    pub fn run(&self, args: &[&str]) -> CliResult {
        let output = Command::new(&self.bin)
            .arg("--db")
            .arg(&self.db)
            .args(args)
            .env_remove("JSONDB_PATH")
            .env_remove("JSONDB_INDENT")
            .env_remove("RUST_LOG")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .unwrap();

        CliResult {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Run and require success
    pub fn ok(&self, args: &[&str]) -> String {
        let result = self.run(args);
        assert!(result.success, "{:?} failed: {}", args, result.stderr);
        result.stdout
    }

    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&self.ok(args)).unwrap()
    }

    pub fn raw_file(&self) -> String {
        std::fs::read_to_string(&self.db).unwrap()
    }
}

// ============== Tests ==============

#[test]
fn test_first_run_creates_empty_document() {
    let cli = JsonDbCli::new();
    assert_eq!(cli.json(&["dump"]), serde_json::json!({}));
    assert_eq!(cli.raw_file(), "{}");
}

#[test]
fn test_records_persist_between_runs() {
    let cli = JsonDbCli::new();
    cli.ok(&["add", "users", "name=Alice", "age=30"]);
    cli.ok(&["add", "users", "--json", r#"{"name": "Bob", "tags": ["x"]}"#]);
    cli.ok(&["add", "admins", "name=Alice"]);

    assert_eq!(
        cli.json(&["get", "users"]),
        serde_json::json!([{"name": "Alice", "age": 30}, {"name": "Bob", "tags": ["x"]}])
    );
    assert_eq!(
        cli.json(&["find", "name", "Alice"]),
        serde_json::json!([{"name": "Alice", "age": 30}, {"name": "Alice"}])
    );
    assert_eq!(cli.ok(&["tables"]), "users\nadmins\n");
    assert!(cli.raw_file().contains("\n    \"users\": [\n        {\n"));
}

#[test]
fn test_corrupt_file_is_reset() {
    let cli = JsonDbCli::new();
    std::fs::write(cli.db(), "not json").unwrap();

    let result = cli.run(&["get", "users"]);
    assert!(result.success);
    assert_eq!(result.stdout, "[]\n");
    assert_eq!(cli.raw_file(), "{}");
}

#[test]
fn test_object_with_foreign_values_is_kept() {
    let cli = JsonDbCli::new();
    let text = r#"{"users": [{"name": "Alice"}], "meta": "v1"}"#;
    std::fs::write(cli.db(), text).unwrap();

    let result = cli.run(&["get", "users"]);
    assert!(!result.success);
    assert_eq!(result.exit_code, Some(1));
    assert!(result.stderr.contains("Corrupt document"), "{}", result.stderr);
    assert_eq!(cli.raw_file(), text);
}

#[test]
fn test_not_found_exits_nonzero() {
    let cli = JsonDbCli::new();
    cli.ok(&["add", "t", "a=1"]);
    let before = cli.raw_file();

    let result = cli.run(&["delete", "t", "5"]);
    assert!(!result.success);
    assert_eq!(result.exit_code, Some(1));
    assert!(result
        .stderr
        .contains("Error: Data at index 5 does not exist in table 't'"));

    let result = cli.run(&["update-where", "ghost", "a", "1", "2"]);
    assert!(!result.success);
    assert!(result.stderr.contains("Error: Table 'ghost' does not exist"));

    assert_eq!(cli.raw_file(), before);
}

#[test]
fn test_clear_all_and_destroy() {
    let cli = JsonDbCli::new();
    cli.ok(&["add", "t", "a=1"]);

    cli.ok(&["clear-all"]);
    assert_eq!(cli.raw_file(), "{}");

    cli.ok(&["destroy"]);
    assert!(!cli.db().exists());
}

#[test]
fn test_bad_field_argument() {
    let cli = JsonDbCli::new();
    let result = cli.run(&["add", "t", "oops"]);
    assert!(!result.success);
    assert!(result.stderr.contains("Invalid field 'oops'"));
}
