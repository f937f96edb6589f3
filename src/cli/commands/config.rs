//! Config command: show the merged configuration.

use super::CommandContext;
use crate::cli::ConfigArgs;
use crate::config::{ENV_PREFIX, KNOWN_KEYS};
use crate::error::Result;
use serde_json::json;
use std::path::PathBuf;

/// Execute the config command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or serialized.
pub fn execute(args: &ConfigArgs, ctx: &CommandContext) -> Result<()> {
    if args.list {
        return list_keys(ctx.json);
    }

    let dir = args.repo.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = ctx.load_config(Some(&dir))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}

fn list_keys(json: bool) -> Result<()> {
    let rows: Vec<(&str, String)> = KNOWN_KEYS
        .iter()
        .map(|key| (*key, env_name(key)))
        .collect();

    if json {
        let payload: Vec<_> = rows
            .iter()
            .map(|(key, env)| json!({ "key": key, "env": env }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for (key, env) in rows {
            println!("{key:<28} {env}");
        }
    }
    Ok(())
}

fn env_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.replace('.', "_").to_uppercase())
}
