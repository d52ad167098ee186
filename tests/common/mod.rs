#![allow(dead_code)]

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let p = std::env::temp_dir().join(format!("{}-{}-{}", prefix, std::process::id(), nanos));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

/// A running `edugraded` speaking JSON lines over its stdio.
pub struct Daemon {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl Daemon {
    /// Local backend rooted at `data_dir`, whatever the caller's environment.
    pub fn local(data_dir: &Path) -> Self {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_edugraded"));
        cmd.env_remove("EDUGRADE_BRIDGE");
        Self::spawn(cmd, data_dir)
    }

    pub fn with_bridge(data_dir: &Path, bridge: &str) -> Self {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_edugraded"));
        cmd.env("EDUGRADE_BRIDGE", bridge);
        Self::spawn(cmd, data_dir)
    }

    fn spawn(mut cmd: Command, data_dir: &Path) -> Self {
        let mut child = cmd
            .env("EDUGRADE_DATA_DIR", data_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn edugraded");
        let stdin = child.stdin.take().expect("child stdin");
        let stdout = child.stdout.take().expect("child stdout");
        Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            next_id: 0,
        }
    }

    /// Writes one raw line and reads the reply.
    pub fn send_line(&mut self, line: &str) -> Value {
        let stdin = self.stdin.as_mut().expect("daemon stdin open");
        writeln!(stdin, "{}", line).expect("write request");
        stdin.flush().expect("flush request");
        let mut reply = String::new();
        self.stdout.read_line(&mut reply).expect("read response line");
        assert!(!reply.trim().is_empty(), "no reply to {}", line);
        serde_json::from_str(reply.trim()).expect("parse response json")
    }

    /// Full response envelope; the id is checked to round-trip.
    pub fn call(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id.to_string();
        let resp = self.send_line(&json!({ "id": id, "method": method, "params": params }).to_string());
        assert_eq!(resp["id"], json!(id), "id echo for {}", method);
        resp
    }

    /// `result` of a call that must succeed.
    pub fn ok(&mut self, method: &str, params: Value) -> Value {
        let resp = self.call(method, params);
        assert_eq!(resp["ok"], json!(true), "{} failed: {}", method, resp);
        resp["result"].clone()
    }

    /// `error` of a call that must fail.
    pub fn err(&mut self, method: &str, params: Value) -> Value {
        let resp = self.call(method, params);
        assert_eq!(resp["ok"], json!(false), "{} unexpectedly succeeded: {}", method, resp);
        resp["error"].clone()
    }

    /// Closes stdin and waits for the daemon to exit.
    pub fn shutdown(mut self) {
        self.stdin.take();
        let _ = self.child.wait();
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            let _ = self.child.wait();
        }
    }
}
