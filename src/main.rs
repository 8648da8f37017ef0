mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use std::cell::OnceCell;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    host: Option<String>,
    api_version: Option<String>,
    config: OnceCell<Config>,
}

impl Context {
    /// Effective configuration, loaded on first use
    pub fn config(&self) -> Result<&Config> {
        if let Some(config) = self.config.get() {
            return Ok(config);
        }
        let loaded = Config::load()?.with_overrides(self.host.clone(), self.api_version.clone())?;
        log::debug!(
            "Using {} ({}), timeout {}s",
            loaded.host,
            loaded.api_version,
            loaded.timeout_secs
        );
        Ok(self.config.get_or_init(|| loaded))
    }
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

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        host: cli.host,
        api_version: cli.api_version,
        config: OnceCell::new(),
    };

    if let Err(err) = run(&ctx, cli.command) {
        match err.downcast_ref::<graphkit::Error>() {
            Some(api) => ui::api_error(api),
            None => ui::error(&format!("{err:#}")),
        }
        if ctx.verbose > 0 {
            eprintln!("{err:?}");
        }
        std::process::exit(1);
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Normalize { file } => commands::json::normalize(&file),
        Command::Merge(pair) => commands::json::merge(&pair),
        Command::Update { pair, options } => commands::json::update(ctx, &pair, &options),
        Command::Diff {
            pair,
            options,
            paths,
            text,
        } => commands::json::diff(ctx, &pair, &options, paths, text),
        Command::Read(args) => commands::remote::read(ctx, &args),
        Command::List { remote, ids } => commands::remote::list(ctx, &remote, ids),
        Command::Refs(cmd) => commands::refs::run(ctx, cmd),
        Command::Config(cmd) => commands::config::run(ctx, cmd),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "graphsync", &mut io::stdout());
            Ok(())
        }
    }
}
