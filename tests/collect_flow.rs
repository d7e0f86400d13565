use std::io::Write;
use std::process::{Command, Stdio};

fn run_collect(args: &[&str], input: &str) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_archgov");
    let mut child = Command::new(bin)
        .arg("collect")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn collect");
    child
        .stdin
        .take()
        .expect("child stdin")
        .write_all(input.as_bytes())
        .expect("write dialogue");
    child.wait_with_output().expect("collect output")
}

#[test]
fn two_component_dialogue_finalizes_with_summary() {
    let output = run_collect(
        &[],
        "componente-auth\n2.1.0\nsim\ncomponente-database\n1.5.2\nn\u{e3}o\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("Component collection started"));
    assert!(stdout.contains("Recorded componente-auth -> 2.1.0"));
    assert!(stdout.contains("Recorded componente-database -> 1.5.2"));
    assert!(stdout.contains("Validation finished: 2 component(s) processed, 2 passed, 0 failed."));
}

#[test]
fn invalid_input_reprompts_and_dialogue_still_completes() {
    let output = run_collect(&[], "bad name\ncomponente-auth\nv1\n2.1.0\nfim\n");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("does not match the expected format"));
    assert!(stdout.contains("suggested action: retry"));
    assert!(stdout.contains("Validation finished: 1 component(s) processed, 1 passed, 0 failed."));
}

#[test]
fn json_flag_emits_typed_final_result() {
    let output = run_collect(&["--json"], "componente-auth\n2.1.0\nnao\n");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let json_start = stdout.find('{').expect("json object in output");
    let result: serde_json::Value =
        serde_json::from_str(&stdout[json_start..]).expect("parse final result");
    assert_eq!(result["processed"], 1);
    assert_eq!(result["valid"], 1);
    assert_eq!(result["failed"], 0);
    assert_eq!(result["collected"][0]["name"], "componente-auth");
    assert_eq!(result["verdicts"][0]["passed"], true);
}

#[test]
fn ending_input_before_finalizing_fails() {
    let output = run_collect(&[], "componente-auth\n");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf8 stderr");
    assert!(stderr.contains("input ended before the collection was finalized"));
}
