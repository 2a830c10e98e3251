//! Diary CLI - personal diary and task keeper with per-entry encryption
//!
//! This is the command-line interface for the diary core library.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;

use clap::Parser;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{diaries, maintenance, notifications, tasks, users};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = errors::hint(&e) {
            eprintln!("{}", hint);
        }
        std::process::exit(errors::exit_code(&e));
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Completions need no config or database.
    if let Commands::Completions(args) = &cli.command {
        return maintenance::handle_completions(args);
    }

    let ctx = AppContext::load(cli)?;
    logging::init(cli.verbose, &ctx.config().log.level);

    match &cli.command {
        Commands::Register(args) => users::handle_register(&ctx, args),
        Commands::Diary(command) => diaries::handle(&ctx, command),
        Commands::Task(command) => tasks::handle(&ctx, command),
        Commands::Notify(command) => notifications::handle(&ctx, command),
        Commands::Check => maintenance::handle_check(&ctx),
        Commands::Config(command) => maintenance::handle_config(&ctx, command),
        Commands::Completions(args) => maintenance::handle_completions(args),
    }
}
