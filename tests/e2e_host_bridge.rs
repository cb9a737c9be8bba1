//! End-to-end tests for the `typeahead-host` binary (stdin/stdout JSON bridge).
//!
//! Each test spawns a fresh subprocess of the binary, sends JSON commands
//! over stdin, and reads JSON responses/events from stdout.

use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

// ---------------------------------------------------------------------------
// Test harness
// ---------------------------------------------------------------------------

struct HostBridgeHarness {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    reader: Lines<BufReader<ChildStdout>>,
}

impl HostBridgeHarness {
    async fn spawn(config: &str) -> (Self, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, config).expect("write config");

        let mut child = Command::new(env!("CARGO_BIN_EXE_typeahead-host"))
            .arg("--config")
            .arg(&config_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn typeahead-host");

        let child_stdin = child.stdin.take().expect("no stdin on child process");
        let child_stdout = child.stdout.take().expect("no stdout on child process");

        let harness = Self {
            child,
            stdin: BufWriter::new(child_stdin),
            reader: BufReader::new(child_stdout).lines(),
        };
        (harness, dir)
    }

    /// Send a command and return the next response (skipping events).
    async fn send(&mut self, cmd: Value) -> Value {
        let mut json = serde_json::to_string(&cmd).unwrap();
        json.push('\n');
        self.stdin.write_all(json.as_bytes()).await.unwrap();
        self.stdin.flush().await.unwrap();
        self.read_response().await
    }

    /// Read the next JSON line from stdout (with timeout).
    async fn read_line(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(10), self.reader.next_line())
            .await
            .expect("timeout reading from typeahead-host")
            .expect("IO error reading from typeahead-host")
            .expect("unexpected EOF from typeahead-host");
        serde_json::from_str(&line).unwrap_or_else(|e| {
            panic!("invalid JSON from typeahead-host: {e}\nraw line: {line}");
        })
    }

    /// Read lines until a response (has an `ok` field) arrives.
    async fn read_response(&mut self) -> Value {
        loop {
            let value = self.read_line().await;
            if value.get("ok").is_some() {
                return value;
            }
        }
    }

    /// Read lines until a state event satisfying `predicate` arrives.
    async fn wait_for_state(&mut self, predicate: impl Fn(&Value) -> bool) -> Value {
        loop {
            let value = self.read_line().await;
            if value["event"] == "state" && predicate(&value) {
                return value;
            }
        }
    }

    async fn shutdown(mut self) {
        let response = self.send(json!({"id": "bye", "cmd": "stop"})).await;
        assert_eq!(response["ok"], true);
        let status = tokio::time::timeout(Duration::from_secs(10), self.child.wait())
            .await
            .expect("timeout waiting for exit")
            .expect("wait failed");
        assert!(status.success());
    }
}

const FAST: &str = r#"
[session]
debounce_ms = 20
first_page_delay_ms = 10
next_page_delay_ms = 10
per_page = 2

[endpoint]
min_delay_ms = 1
max_delay_ms = 5
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_command_returns_ranked_page() {
    let (mut host, _dir) = HostBridgeHarness::spawn(FAST).await;
    let response = host
        .send(json!({"id": "1", "cmd": "search", "params": "q=%D1%84%D1%80%D0%B5%D1%81%D0%BA%D0%B8&perPage=5"}))
        .await;
    assert_eq!(response["id"], "1");
    assert_eq!(response["ok"], true);
    assert_eq!(response["result"]["meta"]["query"], "фрески");
    assert_eq!(response["result"]["items"][0]["id"], "13");
    host.shutdown().await;
}

#[tokio::test]
async fn forced_error_query_returns_internal_error() {
    let (mut host, _dir) = HostBridgeHarness::spawn(FAST).await;
    let response = host
        .send(json!({"id": "e", "cmd": "search", "params": "q=ERROR"}))
        .await;
    assert_eq!(response["ok"], false);
    assert_eq!(response["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(response["error"]["error"], "Forced error for query testing");
    host.shutdown().await;
}

#[tokio::test]
async fn interactive_session_streams_state_events() {
    let (mut host, _dir) = HostBridgeHarness::spawn(FAST).await;

    let response = host
        .send(json!({"id": "q", "cmd": "set_query", "text": "search"}))
        .await;
    assert_eq!(response["result"]["phase"], "debouncing");

    let loaded = host.wait_for_state(|s| s["phase"] == "loaded").await;
    assert_eq!(loaded["effectiveQuery"], "search");
    assert_eq!(loaded["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(loaded["hasMore"], true);

    let response = host.send(json!({"id": "m", "cmd": "load_more"})).await;
    assert_eq!(response["result"]["accepted"], true);
    let more = host
        .wait_for_state(|s| s["phase"] == "loaded" && s["pages"].as_array().map(Vec::len) == Some(2))
        .await;
    assert!(more["items"].as_array().map(Vec::len).unwrap_or(0) > 2);

    let response = host.send(json!({"id": "r", "cmd": "reset"})).await;
    assert_eq!(response["result"]["phase"], "idle");
    host.shutdown().await;
}

#[tokio::test]
async fn malformed_line_gets_parse_error() {
    let (mut host, _dir) = HostBridgeHarness::spawn(FAST).await;
    host.stdin.write_all(b"{broken\n").await.unwrap();
    host.stdin.flush().await.unwrap();
    let response = host.read_response().await;
    assert_eq!(response["id"], "parse-error");
    assert_eq!(response["error"]["code"], "BAD_REQUEST");
    host.shutdown().await;
}
