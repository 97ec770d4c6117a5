//! CLI arg parsing tests for batedor
use std::process::Command;

use assert_cmd::prelude::*;

fn run(args: &[&str]) -> (std::process::Output, String) {
    let output = Command::cargo_bin("batedor")
        .expect("batedor binary")
        .args(args)
        .output()
        .expect("run batedor");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output, text)
}

#[test]
fn test_help_mentions_short_and_long_flags() {
    let (out, text) = run(&["--help"]);
    assert!(out.status.success());
    assert!(
        text.contains("--web")
            && text.contains("--port")
            && text.contains("-p")
            && text.contains("--db")
            && text.contains("--headless"),
        "help text missing expected flags\n{text}"
    );
}

#[test]
fn test_flags_before_help_are_accepted() {
    // --help after other flags exits early, so nothing binds or samples
    for args in [
        &["--web", "--port", "9555", "--help"][..],
        &["-p", "9556", "--help"][..],
        &["--db", "/tmp/batedor-test.db", "--headless", "--help"][..],
    ] {
        let (out, text) = run(args);
        assert!(out.status.success(), "{args:?} did not succeed");
        assert!(text.contains("Usage:"));
    }
}

#[test]
fn test_bad_port_is_rejected() {
    let (out, text) = run(&["--port", "not-a-port"]);
    assert!(!out.status.success());
    assert!(text.contains("invalid port"), "{text}");
}

#[test]
fn test_unknown_flag_is_rejected() {
    let (out, text) = run(&["--enableSSL"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(text.contains("Unexpected argument"));
}
