use assert_cmd::Command;
use predicates::prelude::*;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", "/nonexistent/bf.toml");
    cmd
}

#[test]
fn balanced_program_reports_counts() {
    cargo_bin()
        .args(["check", "+[>[-]<]."])
        .assert()
        .success()
        .stdout("ok: 9 commands, 2 loops\n");
}

#[test]
fn check_never_executes() {
    // Would underflow and block on input if it ran.
    cargo_bin()
        .args(["check", "<,."])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok: 3 commands"));
}

#[test]
fn unbalanced_program_exits_3() {
    cargo_bin()
        .args(["check", "[[]"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Unmatched bracket '['"));
}
