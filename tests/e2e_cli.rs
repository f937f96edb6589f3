//! End-to-end tests for the `push-gate` binary.
//!
//! Drives real git repositories with `awk` standing in for the style
//! checker: it flags every line containing `BAD`.

mod common;

use common::cli::push_gate;
use common::{GitFixture, git_available, init_test_logging};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const AWK_PROGRAM: &str = r#"/BAD/ { printf "stdin:%d:1: X100 bad token\n", NR }"#;

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("gate.yaml");
    let yaml = format!(
        "branch:\n  prefixes:\n    - 'JIRA-\\d+'\nlint:\n  command: awk\n  args:\n    - '{AWK_PROGRAM}'\n{extra}"
    );
    fs::write(&path, yaml).expect("write config");
    path
}

struct Pushed {
    fixture: GitFixture,
    home: TempDir,
    config: PathBuf,
    fork: String,
}

/// master with a legacy violation on line 2, then a branch on top of it.
fn repo_with_branch(branch_content: &str) -> (Pushed, String) {
    let fixture = GitFixture::new();
    fixture.write("app.py", "ok = 1\nBAD = 2\nok = 3\n");
    fixture.write("README.md", "BAD docs\n");
    let fork = fixture.commit("base");
    fixture.git(&["checkout", "-q", "-b", "JIRA-7"]);
    fixture.write("app.py", branch_content);
    let tip = fixture.commit("work");

    let home = TempDir::new().expect("home");
    let config = write_config(home.path(), "");
    (
        Pushed {
            fixture,
            home,
            config,
            fork,
        },
        tip,
    )
}

fn check(pushed: &Pushed, event: &str) -> assert_cmd::Command {
    let mut cmd = push_gate(pushed.home.path());
    cmd.arg("check")
        .arg("--event")
        .arg(event)
        .arg("--repo")
        .arg(pushed.fixture.path())
        .arg("--config")
        .arg(&pushed.config);
    cmd
}

#[test]
fn legacy_violation_is_accepted() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, tip) = repo_with_branch("ok = 1\nBAD = 2\nok = 3\nok = 4\n");
    check(&pushed, &format!("{} {tip} refs/heads/JIRA-7", pushed.fork))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn new_violation_is_rejected_with_report() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, tip) = repo_with_branch("ok = 1\nBAD = 2\nok = 3\nBAD = 4\n");
    check(&pushed, &format!("{} {tip} refs/heads/JIRA-7", pushed.fork))
        .assert()
        .code(3)
        .stdout(predicate::str::contains("app.py:4:1: X100 bad token"))
        .stdout(predicate::str::contains("app.py:2:").not());
}

#[test]
fn json_outcome_on_rejection() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, tip) = repo_with_branch("BAD = 0\nok = 1\nBAD = 2\nok = 3\n");
    let output = check(&pushed, &format!("{} {tip} refs/heads/JIRA-7", pushed.fork))
        .arg("--json")
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(3));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["decision"], "style_violation");
    assert_eq!(value["violations"][0]["line"], 1);
    assert_eq!(value["violations"].as_array().map(Vec::len), Some(1));
}

#[test]
fn new_branch_with_bad_name_is_rejected() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, tip) = repo_with_branch("ok\n");
    check(&pushed, &format!("{} {tip} refs/heads/my-feature", "0".repeat(40)))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("my-feature"));
}

#[test]
fn hook_mode_reads_stdin() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, tip) = repo_with_branch("ok = 1\nBAD = 2\nok = 3\n# more\n");
    let mut cmd = push_gate(pushed.home.path());
    cmd.args(["check", "--repo"])
        .arg(pushed.fixture.path())
        .arg("--config")
        .arg(&pushed.config)
        .write_stdin(format!(
            "{} {tip} refs/heads/JIRA-7\n{} {tip} refs/tags/v1\n",
            pushed.fork,
            "0".repeat(40)
        ))
        .assert()
        .success();
}

#[test]
fn malformed_event_exits_5() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, _) = repo_with_branch("ok\n");
    check(&pushed, "only-two tokens")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Error: Malformed push event"))
        .stderr(predicate::str::contains("Hint:"))
        .stderr(predicate::str::contains("MALFORMED_INPUT").not());
}

#[test]
fn malformed_event_with_json_flag_is_structured() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, _) = repo_with_branch("ok\n");
    check(&pushed, "only-two tokens")
        .arg("--json")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("MALFORMED_INPUT"));
}

#[test]
fn unopenable_log_file_is_fatal() {
    init_test_logging();
    let home = TempDir::new().expect("home");
    let config = write_config(home.path(), "");
    push_gate(home.path())
        .args(["branch", "JIRA-1", "--config"])
        .arg(&config)
        .arg("--log-file")
        .arg(home.path().join("no-such-dir").join("gate.log"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: cannot open log file"));
}

#[test]
fn every_pushed_ref_is_checked() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, first) = repo_with_branch("ok = 1\nBAD = 2\nok = 3\nBAD = 4\n");
    pushed.fixture.git(&["checkout", "-q", "-b", "JIRA-9", &pushed.fork]);
    pushed.fixture.write("lib.py", "BAD = 1\n");
    let second = pushed.fixture.commit("more work");

    let mut cmd = push_gate(pushed.home.path());
    cmd.args(["check", "--repo"])
        .arg(pushed.fixture.path())
        .arg("--config")
        .arg(&pushed.config)
        .write_stdin(format!(
            "{fork} {first} refs/heads/JIRA-7\n{fork} {second} refs/heads/JIRA-9\n",
            fork = pushed.fork
        ))
        .assert()
        .code(3)
        .stdout(predicate::str::contains("app.py:4:1: X100 bad token"))
        .stdout(predicate::str::contains("lib.py:1:1: X100 bad token"))
        .stdout(predicate::str::contains("2 violation(s) in 2 file(s)"));
}

#[test]
fn missing_checker_exits_4() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, tip) = repo_with_branch("ok\n");
    let mut cmd = check(&pushed, &format!("{} {tip} refs/heads/JIRA-7", pushed.fork));
    cmd.env("PUSH_GATE_LINT_COMMAND", "no-such-checker-binary-xyz")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("no-such-checker-binary-xyz"));
}

#[test]
fn unrelated_history_exits_6() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let (pushed, _) = repo_with_branch("ok\n");
    pushed.fixture.git(&["checkout", "-q", "--orphan", "JIRA-8"]);
    pushed.fixture.write("other.py", "x = 1\n");
    let orphan = pushed.fixture.commit("orphan");
    check(&pushed, &format!("{} {orphan} refs/heads/JIRA-8", "0".repeat(40)))
        .assert()
        .code(6);
}

#[test]
fn branch_command_reports_decision() {
    init_test_logging();
    let home = TempDir::new().expect("home");
    let config = write_config(home.path(), "");
    push_gate(home.path())
        .args(["branch", "JIRA-12-login", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("allowed"));
    push_gate(home.path())
        .args(["branch", "wip", "--config"])
        .arg(&config)
        .assert()
        .code(2);
}

#[test]
fn new_lines_command_prints_line_numbers() {
    init_test_logging();
    let dir = TempDir::new().expect("dir");
    let old = dir.path().join("old.py");
    let new = dir.path().join("new.py");
    fs::write(&old, "a\nb\nc\n").expect("write");
    fs::write(&new, "a\nB\nc\nd\n").expect("write");
    push_gate(dir.path())
        .arg("new-lines")
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout("2\n4\n");
}

#[test]
fn config_command_shows_precedence() {
    init_test_logging();
    let home = TempDir::new().expect("home");
    let config = write_config(home.path(), "trunk: develop\n");
    let output = push_gate(home.path())
        .args(["config", "--json", "--trunk", "main", "--config"])
        .arg(&config)
        .env("PUSH_GATE_LINT_IGNORE", "E1,E2")
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["trunk"], "main");
    assert_eq!(value["lint"]["command"], "awk");
    assert_eq!(value["lint"]["ignore"], serde_json::json!(["E1", "E2"]));
}

#[test]
fn missing_explicit_config_exits_7() {
    init_test_logging();
    let home = TempDir::new().expect("home");
    push_gate(home.path())
        .args(["branch", "x", "--config"])
        .arg(home.path().join("absent.yaml"))
        .assert()
        .code(7);
}

#[test]
fn completions_mention_subcommands() {
    let home = TempDir::new().expect("home");
    push_gate(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new-lines"));
}

#[test]
fn installed_pre_receive_hook_gates_real_pushes() {
    init_test_logging();
    if !git_available() {
        return;
    }
    let remote_dir = TempDir::new().expect("remote");
    let remote = remote_dir.path();
    let status = Command::new("git")
        .args(["init", "-q", "--bare", "-b", "master"])
        .arg(remote)
        .status()
        .expect("git init --bare");
    assert!(status.success());

    let config = write_config(remote, "");
    fs::rename(&config, remote.join("push-gate.yaml")).expect("install config");
    let hook = remote.join("hooks").join("pre-receive");
    fs::write(
        &hook,
        format!(
            "#!/bin/sh\nexec '{}' check\n",
            assert_cmd::cargo::cargo_bin!("push-gate").display()
        ),
    )
    .expect("write hook");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    let local = GitFixture::new();
    local.write("app.py", "ok = 1\nBAD = 2\n");
    local.commit("base");
    local.git(&["remote", "add", "origin", &remote.display().to_string()]);

    let home = TempDir::new().expect("home");
    let push = |args: &[&str]| {
        Command::new("git")
            .args(args)
            .current_dir(local.path())
            .env("HOME", home.path())
            .env_remove("PUSH_GATE_CONFIG")
            .output()
            .expect("git push")
    };

    assert!(push(&["push", "origin", "master"]).status.success());

    local.git(&["checkout", "-q", "-b", "feature-x"]);
    local.write("app.py", "ok = 1\nBAD = 2\nok = 3\n");
    local.commit("clean work");
    let rejected = push(&["push", "origin", "feature-x"]);
    assert!(!rejected.status.success());
    assert!(String::from_utf8_lossy(&rejected.stderr).contains("feature-x"));

    local.git(&["checkout", "-q", "-b", "JIRA-5"]);
    assert!(push(&["push", "origin", "JIRA-5"]).status.success());

    local.write("app.py", "ok = 1\nBAD = 2\nok = 3\nBAD = 4\n");
    local.commit("bad work");
    let rejected = push(&["push", "origin", "JIRA-5"]);
    assert!(!rejected.status.success());
    assert!(String::from_utf8_lossy(&rejected.stderr).contains("app.py:4:1"));
}
