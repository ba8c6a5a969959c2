#![allow(dead_code)]

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub fn tapeflow_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tapeflow"))
}

/// Temp home with its sheets directory, passed to every command.
pub struct TestEnv {
    pub home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("create temp home"),
        }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.home.path().join("sheets")
    }

    pub fn sheet(&self, location: &str) -> PathBuf {
        self.store_dir().join(format!("{}.csv", location))
    }

    pub fn read_sheet(&self, location: &str) -> String {
        std::fs::read_to_string(self.sheet(location)).expect("read sheet")
    }

    pub fn write_sheet(&self, location: &str, content: &str) {
        std::fs::create_dir_all(self.store_dir()).expect("create store dir");
        std::fs::write(self.sheet(location), content).expect("write sheet");
    }

    pub fn write_config(&self, content: &str) {
        std::fs::write(self.home.path().join("config.toml"), content).expect("write config");
    }

    pub fn args(&self, args: &[&str]) -> Vec<String> {
        let mut full = vec![
            "--store-dir".to_string(),
            self.store_dir().to_string_lossy().to_string(),
        ];
        full.extend(args.iter().map(|arg| arg.to_string()));
        full
    }

    pub fn envs(&self) -> Vec<(String, String)> {
        vec![
            (
                "TAPEFLOW_HOME".to_string(),
                self.home.path().to_string_lossy().to_string(),
            ),
            ("RUST_LOG".to_string(), "error".to_string()),
        ]
    }

    pub fn run(&self, args: &[&str]) -> Output {
        run_cli(&self.args(args), &self.envs())
    }

    pub fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> T {
        run_cli_json(&self.args(args), &self.envs())
    }

    pub fn run_json_value(&self, args: &[&str]) -> serde_json::Value {
        run_cli_json_value(&self.args(args), &self.envs())
    }
}

pub fn run_cli(args: &[String], envs: &[(String, String)]) -> Output {
    run_cli_with_input(args, envs, "")
}

pub fn run_cli_with_input(args: &[String], envs: &[(String, String)], input: &str) -> Output {
    let mut cmd = Command::new(tapeflow_bin());
    cmd.args(args)
        .env_remove("TAPEFLOW_STORE_DIR")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in envs {
        cmd.env(key, value);
    }
    let mut child = cmd.spawn().expect("failed to execute tapeflow CLI");
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).expect("write stdin");
    }
    child.wait_with_output().expect("wait for tapeflow CLI")
}

pub fn assert_cli_success(output: &Output, args: &[String]) {
    assert!(
        output.status.success(),
        "command failed: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn parse_json_output(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json_start = stdout.find(|c| c == '{' || c == '[').unwrap_or_else(|| {
        panic!(
            "no JSON payload found in output\nstdout:\n{}\nstderr:\n{}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        )
    });
    let json_text = &stdout[json_start..];
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    serde_json::Value::deserialize(&mut deserializer).unwrap_or_else(|err| {
        panic!(
            "failed to parse JSON output: {}\nstdout:\n{}\nstderr:\n{}",
            err,
            stdout,
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

pub fn run_cli_json_value(args: &[String], envs: &[(String, String)]) -> serde_json::Value {
    let output = run_cli(args, envs);
    assert_cli_success(&output, args);
    parse_json_output(&output)
}

pub fn run_cli_json<T: DeserializeOwned>(args: &[String], envs: &[(String, String)]) -> T {
    let value = run_cli_json_value(args, envs);
    serde_json::from_value(value).expect("failed to deserialize JSON output")
}

pub fn today() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}
