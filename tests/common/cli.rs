use assert_cmd::Command;
use std::path::Path;

/// `push-gate` with a clean environment rooted at `home`.
pub fn push_gate(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("push-gate"));
    cmd.current_dir(home);
    cmd.env("HOME", home);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "push_gate=debug");
    cmd.env_remove("PUSH_GATE_CONFIG");
    cmd.env_remove("GIT_DIR");
    cmd
}
