//! Branch command: test a name against the naming convention.

use super::CommandContext;
use crate::cli::BranchArgs;
use crate::error::Result;
use crate::gate::{BranchPolicy, check_branch_name};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct BranchOutput<'a> {
    branch: &'a str,
    allowed: bool,
    pattern: &'a str,
    #[serde(rename = "match")]
    match_mode: &'a str,
}

/// Execute the branch command. Returns whether the name is allowed.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or a prefix pattern
/// does not compile.
pub fn execute(args: &BranchArgs, ctx: &CommandContext) -> Result<bool> {
    let dir = args.repo.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = ctx.load_config(Some(&dir))?;
    let policy = BranchPolicy::compile(
        &config.branch.prefixes,
        config.branch.builtin_conventions,
        config.branch.match_mode,
    )?;
    let name = args.name.strip_prefix("refs/heads/").unwrap_or(&args.name);
    let allowed = check_branch_name(name, &policy);

    if ctx.json {
        let output = BranchOutput {
            branch: name,
            allowed,
            pattern: policy.pattern(),
            match_mode: policy.mode().as_str(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if allowed {
        println!("{name}: allowed");
    } else {
        println!("{name}: rejected (must match {})", policy.pattern());
    }

    Ok(allowed)
}
