mod cli;
mod commands;
mod config;
mod funcfile;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::{ClientConfig, ConfigFile};
use routekit::Client;
use std::io;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub api_url: String,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Err(err) = run(cli) {
        ui::error(&format!("{err:#}"));
        if let Some(err) = err.downcast_ref::<routekit::Error>() {
            log::info!("{}: {}", err.category().description(), err.category().advice());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "fnroutes", &mut io::stdout());
        return Ok(());
    }

    let config = ClientConfig::resolve(cli.api_url, &ConfigFile::load()?);
    log::debug!("Using API at {}", config.api_url);

    let ctx = Context {
        quiet: cli.quiet,
        api_url: config.api_url,
    };
    let client = Client::new(ctx.api_url.clone());

    match cli.command {
        Command::Routes(cmd) => commands::routes::run(&ctx, &client, cmd),
        Command::Call(args) => commands::call::run(&client, args),
        Command::Completions { .. } => Ok(()),
    }
}
