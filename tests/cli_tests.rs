//! CLI surface tests: list, describe, call.

use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    Command::cargo_bin("script-sandbox").unwrap()
}

#[test]
fn test_list_shows_local_modules() {
    cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("json.encode"))
        .stdout(predicate::str::contains("math.atan2(y: int|float, x: int|float) -> float"))
        .stdout(predicate::str::contains("slack.send_text_message"));
}

#[test]
fn test_list_filters_by_module() {
    cli()
        .arg("list")
        .arg("--module")
        .arg("hash")
        .assert()
        .success()
        .stdout(predicate::str::contains("hash.sha256"))
        .stdout(predicate::str::contains("slack.").not());
}

#[test]
fn test_list_unknown_module_fails() {
    cli()
        .arg("list")
        .arg("--module")
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no builtins registered"));
}

#[test]
fn test_describe_shows_optionality() {
    cli()
        .arg("describe")
        .arg("slack.send_text_message")
        .assert()
        .success()
        .stdout(predicate::str::contains("target: string [required]"))
        .stdout(predicate::str::contains("thread_ts: string|None [optional]"));
}

#[test]
fn test_describe_unknown_function_fails() {
    cli()
        .arg("describe")
        .arg("github.nonexistent_function")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "unknown function: github.nonexistent_function",
        ));
}

#[test]
fn test_call_json_encode() {
    cli()
        .arg("call")
        .arg("json.encode")
        .arg("--args")
        .arg(r#"[{"foo": ["bar", "baz"]}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{\"foo\":[\"bar\",\"baz\"]}"#));
}

#[test]
fn test_call_base64_with_kwargs() {
    cli()
        .arg("call")
        .arg("base64.encode")
        .arg("--args")
        .arg(r#"["hello world!"]"#)
        .arg("--kwargs")
        .arg(r#"{"encoding": "standard"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("aGVsbG8gd29ybGQh"));
}

#[test]
fn test_call_unknown_keyword_names_parameter() {
    cli()
        .arg("call")
        .arg("hash.sha256")
        .arg("--args")
        .arg(r#"["x"]"#)
        .arg("--kwargs")
        .arg(r#"{"digest": "hex"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown parameter: digest"));
}

#[test]
fn test_call_missing_required_fails() {
    cli()
        .arg("call")
        .arg("hash.sha256")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required parameter: s"));
}
