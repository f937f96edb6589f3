use clap::Parser;
use push_gate::cli::commands::{self, CommandContext};
use push_gate::cli::{Cli, Commands};
use push_gate::config::CliOverrides;
use push_gate::logging::init_logging;
use push_gate::{ErrorCode, GateError, StructuredError};
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        handle_error(&GateError::from(e), cli.json);
    }

    let ctx = build_context(&cli);

    let result = match &cli.command {
        Commands::Check(args) => commands::check::execute(args, &ctx).map(|report| report.exit_code()),
        Commands::Branch(args) => commands::branch::execute(args, &ctx)
            .map(|allowed| if allowed { 0 } else { ErrorCode::NamingViolation.exit_code() }),
        Commands::NewLines(args) => commands::new_lines::execute(args, &ctx).map(|()| 0),
        Commands::Config(args) => commands::config::execute(args, &ctx).map(|()| 0),
        Commands::Version => commands::version::execute(cli.json).map(|()| 0),
        Commands::Completions(args) => commands::completions::execute(args).map(|()| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => handle_error(&e, cli.json),
    }
}

/// Handle errors with structured output support.
///
/// With --json, outputs structured JSON to stderr. Otherwise outputs a
/// human-readable error, colored only when stderr is a terminal.
fn handle_error(err: &GateError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    if json_mode {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_context(cli: &Cli) -> CommandContext {
    CommandContext {
        json: cli.json,
        config_path: cli.config.clone(),
        overrides: CliOverrides {
            trunk: cli.trunk.clone(),
            no_lint: Some(cli.no_lint),
            branch_match: cli.match_mode.map(Into::into),
        },
    }
}
