//! New-lines command: show which lines of a file count as new.

use super::CommandContext;
use crate::cli::NewLinesArgs;
use crate::diff::new_lines_between;
use crate::error::Result;
use serde_json::json;
use std::fs;

/// Execute the new-lines command.
///
/// # Errors
///
/// Returns an error if either file cannot be read or config is invalid.
pub fn execute(args: &NewLinesArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.load_config(None)?;
    let new_text = fs::read_to_string(&args.new)?;
    let old_text = if args.added {
        None
    } else {
        Some(fs::read_to_string(&args.old)?)
    };

    let lines = new_lines_between(old_text.as_deref(), &new_text, config.diff.max_cells);

    if ctx.json {
        println!("{}", json!({ "new_lines": lines }));
    } else {
        for line in &lines {
            println!("{line}");
        }
    }
    Ok(())
}
