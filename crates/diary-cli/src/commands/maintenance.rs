use clap::CommandFactory;
use clap_complete::generate;

use crate::app::AppContext;
use crate::cli::{Cli, CompletionsArgs, ConfigCommand, ConfigInitArgs};
use crate::config::{write_config, DiaryConfig};

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    service.check_integrity()?;
    if !ctx.quiet() {
        println!("Integrity check passed");
    }
    Ok(())
}

pub fn handle_config(ctx: &AppContext, command: &ConfigCommand) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Init(args) => handle_config_init(ctx, args),
        ConfigCommand::Path => {
            println!("{}", ctx.config_path().display());
            Ok(())
        }
    }
}

fn handle_config_init(ctx: &AppContext, args: &ConfigInitArgs) -> anyhow::Result<()> {
    let path = ctx.config_path();
    if path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }

    let config = DiaryConfig::with_database(ctx.database_path()?);
    write_config(path, &config)?;

    if !ctx.quiet() {
        println!("Wrote config to {}", path.display());
    }
    Ok(())
}

pub fn handle_completions(args: &CompletionsArgs) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}
