//! Property-based tests for the branch naming convention.
//!
//! Uses proptest to verify that:
//! - Checking a name always terminates, even for adversarial patterns
//! - Start mode never accepts a name anywhere mode rejects
//! - Conforming prefixes are accepted whatever follows them

use proptest::prelude::*;
use push_gate::gate::{BranchPolicy, MatchMode, check_branch_name};
use std::time::{Duration, Instant};

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

fn compile(prefixes: &[&str], mode: MatchMode) -> BranchPolicy {
    let prefixes: Vec<String> = prefixes.iter().map(ToString::to_string).collect();
    BranchPolicy::compile(&prefixes, true, mode).expect("compile")
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 100, ..Default::default() })]

    #[test]
    fn start_mode_is_stricter(name in "[a-zA-Z0-9/_.-]{0,40}") {
        init_test_logging();
        let anywhere = compile(&[r"JIRA-\d+", r"OPS-\d+"], MatchMode::Anywhere);
        let start = compile(&[r"JIRA-\d+", r"OPS-\d+"], MatchMode::Start);
        if check_branch_name(&name, &start) {
            prop_assert!(check_branch_name(&name, &anywhere));
        }
    }

    #[test]
    fn conforming_prefix_accepts_any_suffix(num in 0u32..100_000, rest in "[a-z0-9/_-]{0,30}") {
        let policy = compile(&[r"JIRA-\d+"], MatchMode::Start);
        let name = format!("JIRA-{num}{rest}");
        prop_assert!(check_branch_name(&name, &policy));
    }

    #[test]
    fn arbitrary_names_terminate(name in ".{0,200}") {
        let policy = compile(&[r"(a+)+b", r"(x|x?)+y", r"([a-z]*)*-\d+"], MatchMode::Anywhere);
        let _ = check_branch_name(&name, &policy);
    }
}

#[test]
fn nested_repetition_does_not_backtrack() {
    init_test_logging();
    let policy = compile(&[r"((a+)+)+b", r"(a|a?)+c", r"(a*)*d"], MatchMode::Start);

    for len in [32, 1_024, 65_536] {
        let name = "a".repeat(len);
        let start = Instant::now();
        assert!(!check_branch_name(&name, &policy));
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "{len} chars took {:?}",
            start.elapsed()
        );
    }
}

#[test]
fn deeply_nested_prefix_is_bounded() {
    init_test_logging();
    let nested = format!("{}a{}", "(".repeat(200), ")+".repeat(200));
    match BranchPolicy::compile(&[nested], false, MatchMode::Anywhere) {
        Ok(policy) => {
            let _ = check_branch_name(&"a".repeat(10_000), &policy);
        }
        Err(err) => assert!(err.to_string().contains("pattern")),
    }
}
