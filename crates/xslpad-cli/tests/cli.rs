use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

const STYLESHEET: &str = "<xsl:stylesheet version=\"1.0\" xmlns:xsl=\"http://www.w3.org/1999/XSL/Transform\">\n<xsl:param name=\"limit\"/>\n<xsl:template match=\"/\">\n<root/>\n</xsl:template>\n</xsl:stylesheet>\n";

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_xslpad-cli") {
        return PathBuf::from(path);
    }
    if let Some(path) = env::var_os("CARGO_BIN_EXE_xslpad_cli") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("xslpad-cli");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_file(name: &str, extension: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "xslpad_cli_{}_{}_{}.{}",
        name,
        now.as_secs(),
        now.subsec_nanos(),
        extension
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .env_remove("XSLPAD_LOG")
        .output()
        .expect("run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn inject_uses_declared_globals_without_params_file() {
    let input = temp_file("inject", "xsl", STYLESHEET);
    let output = run(&["inject", input.to_str().expect("path")]);

    assert!(output.status.success(), "expected success exit code");
    let stdout = stdout(&output);
    assert!(stdout.contains("<!--PARAMS_START-->\n<xsl:param name=\"limit\"/>\n<!--PARAMS_END-->"));
    assert_eq!(stdout.matches("name=\"limit\"").count(), 1);
}

#[test]
fn inject_reads_params_file() {
    let input = temp_file("inject_params", "xsl", STYLESHEET);
    let params = temp_file(
        "inject_params",
        "json",
        r#"[{"name": "input1", "value": "<root/>"}, {"name": ""}]"#,
    );
    let output = run(&[
        "--params",
        params.to_str().expect("path"),
        "inject",
        input.to_str().expect("path"),
    ]);

    assert!(output.status.success(), "expected success exit code");
    let stdout = stdout(&output);
    assert!(stdout.contains("<xsl:param name=\"input1\"/>"));
    assert!(!stdout.contains("limit"), "inline declaration should be stripped");
}

#[test]
fn strip_reads_stdin() {
    let mut child = Command::new(bin_path())
        .arg("strip")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(STYLESHEET.as_bytes())
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");

    assert!(output.status.success(), "expected success exit code");
    let stdout = stdout(&output);
    assert!(!stdout.contains("xsl:param"));
    assert!(stdout.contains("<xsl:template match=\"/\">"));
}

#[test]
fn names_json_reports_declaration_lines() {
    let input = temp_file("names", "xsl", STYLESHEET);
    let output = run(&["--json", "names", input.to_str().expect("path")]);

    assert!(output.status.success(), "expected success exit code");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["names"], serde_json::json!(["limit"]));
    assert_eq!(value["declarations"][0]["line"], 2);
    assert!(value["block"].is_null());
}

#[test]
fn reconcile_prints_updated_list() {
    let input = temp_file("reconcile", "xsl", STYLESHEET);
    let params = temp_file(
        "reconcile",
        "json",
        r#"[{"name": "stale", "value": ""}, {"name": "kept", "value": "<x/>"}]"#,
    );
    let output = run(&[
        "reconcile",
        "--params",
        params.to_str().expect("path"),
        input.to_str().expect("path"),
    ]);

    assert!(output.status.success(), "expected success exit code");
    let list: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).expect("json");
    let names: Vec<_> = list.iter().map(|entry| entry["name"].clone()).collect();
    assert_eq!(names, vec!["kept", "limit"]);
}

#[test]
fn set_version_rewrites_root_attribute() {
    let input = temp_file("set_version", "xsl", STYLESHEET);
    let output = run(&["set-version", "2.0", input.to_str().expect("path")]);

    assert!(output.status.success(), "expected success exit code");
    assert!(stdout(&output).starts_with("<xsl:stylesheet version=\"2.0\""));
}

#[test]
fn set_version_rejects_unknown_version() {
    let input = temp_file("set_version_bad", "xsl", STYLESHEET);
    let output = run(&["set-version", "3.0", input.to_str().expect("path")]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported XSLT version"));
}

#[test]
fn segment_splits_diagnostics_and_fails_on_errors() {
    let input = temp_file(
        "segment",
        "txt",
        "Warning at line 3\n  unused variable\nError at line 9\n  unknown function\n",
    );
    let output = run(&["segment", input.to_str().expect("path")]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout(&output);
    assert!(stdout.contains("warning: Warning at line 3"));
    assert!(stdout.contains("error: Error at line 9"));
}

#[test]
fn export_then_import_restores_annotated_text() {
    let input = temp_file("export", "xsl", STYLESHEET);
    let exported = run(&["export", input.to_str().expect("path")]);
    assert!(exported.status.success(), "expected success exit code");

    let workspace: serde_json::Value = serde_json::from_slice(&exported.stdout).expect("json");
    assert_eq!(workspace["params"][0]["name"], "limit");
    assert!(!workspace["stylesheet"].as_str().expect("text").contains("xsl:param"));

    let saved = temp_file("import", "json", &stdout(&exported));
    let imported = run(&["import", saved.to_str().expect("path")]);
    assert!(imported.status.success(), "expected success exit code");
    assert!(stdout(&imported).contains("<!--PARAMS_START-->\n<xsl:param name=\"limit\"/>"));
}

#[test]
fn import_rejects_missing_stylesheet() {
    let saved = temp_file("import_bad", "json", r#"{"params": []}"#);
    let output = run(&["import", saved.to_str().expect("path")]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no stylesheet text"));
}

#[test]
fn unknown_command_is_a_usage_error() {
    let output = run(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: xslpad-cli"));
}
