//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str], stdin: Option<&str>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_lexiloop"))
        .args(args)
        .env("LEXILOOP_DATA_DIR", data_dir)
        .env_remove("LEXILOOP_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("write stdin");
        }
    }

    let output = child.wait_with_output().expect("CLI did not exit");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args, None);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("event line is JSON"))
        .collect()
}

#[test]
fn test_vocab_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let added: serde_json::Value = serde_json::from_str(&run_ok(
        dir.path(),
        &["vocab", "add", "gato", "--translation", "cat", "--language", "spanish"],
    ))
    .unwrap();
    assert_eq!(added["word"], "gato");
    assert_eq!(added["review_count"], 0);
    assert_eq!(added["mastery_level"], 1);
    assert_eq!(added["level"], "A1");

    let listed: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["vocab", "list", "--language", "spanish"]))
            .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let other: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["vocab", "list", "--language", "japanese"]))
            .unwrap();
    assert!(other.as_array().unwrap().is_empty());
}

#[test]
fn test_vocab_add_rejects_empty_word() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["vocab", "add", "  "], None);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_vocab_show_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let added: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["vocab", "add", "hello"])).unwrap();
    let id = added["id"].as_i64().unwrap().to_string();

    let shown: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["vocab", "show", &id])).unwrap();
    assert_eq!(shown["word"], "hello");

    run_ok(dir.path(), &["vocab", "delete", &id]);
    let (_, _, code) = run_cli(dir.path(), &["vocab", "show", &id], None);
    assert_ne!(code, 0);
}

#[test]
fn test_template_import_export() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("template.csv");
    let template_arg = template.to_str().unwrap();
    run_ok(dir.path(), &["vocab", "template", template_arg, "--language", "spanish"]);

    let report: serde_json::Value = serde_json::from_str(&run_ok(
        dir.path(),
        &["vocab", "import", template_arg, "--language", "spanish", "--level", "A2"],
    ))
    .unwrap();
    assert_eq!(report["imported"], 2);

    let export = dir.path().join("export.csv");
    run_ok(dir.path(), &["vocab", "export", export.to_str().unwrap(), "--level", "A2"]);
    let text = std::fs::read_to_string(&export).unwrap();
    assert!(text.starts_with("word,translation,example"));
    assert!(text.contains("hola"));
    assert!(text.contains("gracias"));
}

#[test]
fn test_review_run_updates_schedule_and_logs_activity() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["vocab", "add", "one"]);
    run_ok(dir.path(), &["vocab", "add", "two"]);

    let due = run_ok(dir.path(), &["review", "due", "--count"]);
    assert_eq!(due.trim(), "2");

    let (stdout, stderr, code) = run_cli(dir.path(), &["review", "run"], Some("y\nn\n"));
    assert_eq!(code, 0, "review run failed: {stderr}");
    let events = json_lines(&stdout);
    let types: Vec<&str> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        ["SessionStarted", "ReviewRecorded", "ReviewRecorded", "SessionCompleted"]
    );
    assert_eq!(events[1]["outcome"], "correct");
    assert_eq!(events[1]["review_count"], 1);
    assert_eq!(events[1]["mastery_level"], 2);
    assert_eq!(events[2]["outcome"], "incorrect");
    assert_eq!(events[2]["review_count"], 0);
    assert_eq!(events[2]["mastery_level"], 1);
    assert_eq!(events[3]["summary"]["correct"], 1);

    let due = run_ok(dir.path(), &["review", "due", "--count"]);
    assert_eq!(due.trim(), "0");

    let stats: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["stats", "show"])).unwrap();
    assert_eq!(stats["total_activities"], 1);
    assert_eq!(stats["avg_score"], 50.0);
    assert_eq!(stats["by_subject"]["vocabulary"], 1);

    let status: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["review", "status"])).unwrap();
    assert_eq!(status["last_session"]["total"], 2);
}

#[test]
fn test_review_run_abort_leaves_rest_untouched() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["vocab", "add", "one"]);
    run_ok(dir.path(), &["vocab", "add", "two"]);

    let (stdout, _, code) = run_cli(dir.path(), &["review", "run"], Some("y\nq\n"));
    assert_eq!(code, 0);
    let events = json_lines(&stdout);
    let last = events.last().unwrap();
    assert_eq!(last["type"], "SessionAborted");
    assert_eq!(last["remaining"], 1);

    let due = run_ok(dir.path(), &["review", "due", "--count"]);
    assert_eq!(due.trim(), "1");

    let stats: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["stats", "show"])).unwrap();
    assert_eq!(stats["total_activities"], 0);
}

#[test]
fn test_review_run_without_due_items() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["review", "run"], Some(""));
    assert_eq!(code, 0);
    let events = json_lines(&stdout);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "StateSnapshot");
    assert_eq!(events[0]["due_count"], 0);
}

#[test]
fn test_review_run_respects_limit() {
    let dir = tempfile::tempdir().unwrap();
    for word in ["a", "b", "c"] {
        run_ok(dir.path(), &["vocab", "add", word]);
    }
    let (stdout, _, code) = run_cli(dir.path(), &["review", "run", "--limit", "1"], Some("y\n"));
    assert_eq!(code, 0);
    let events = json_lines(&stdout);
    assert_eq!(events[0]["total"], 1);
    assert_eq!(events.last().unwrap()["type"], "SessionCompleted");
}

#[test]
fn test_mistake_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let added: serde_json::Value = serde_json::from_str(&run_ok(
        dir.path(),
        &["mistake", "add", "translate: cat", "--answer", "perro", "--correct", "gato"],
    ))
    .unwrap();
    assert_eq!(added["status"], "pending");
    let id = added["id"].as_i64().unwrap().to_string();

    run_ok(dir.path(), &["mistake", "resolve", &id]);
    let pending: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["mistake", "list", "--status", "pending"]))
            .unwrap();
    assert!(pending.as_array().unwrap().is_empty());
    let reviewed: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["mistake", "list", "--status", "reviewed"]))
            .unwrap();
    assert_eq!(reviewed.as_array().unwrap().len(), 1);
}

#[test]
fn test_config_get_set_reset() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(dir.path(), &["config", "get", "stats.window_days"]).trim(), "7");

    run_ok(dir.path(), &["config", "set", "review.max_session_items", "15"]);
    assert_eq!(
        run_ok(dir.path(), &["config", "get", "review.max_session_items"]).trim(),
        "15"
    );

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "review.nope", "1"], None);
    assert_ne!(code, 0);

    run_ok(dir.path(), &["config", "reset"]);
    assert_eq!(
        run_ok(dir.path(), &["config", "get", "review.max_session_items"]).trim(),
        "0"
    );
}
