use anyhow::{Result, bail};

use crate::cli::ConfigCommand;
use crate::config::Config;
use crate::{Context, paths, ui};

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Init { force } => init(force),
    }
}

fn show(ctx: &Context) -> Result<()> {
    ui::header("Configuration");

    let path = Config::path()?;
    ui::kv("Config directory", &paths::config_dir()?.display().to_string());
    if path.exists() {
        ui::kv("Config file", &path.display().to_string());
    } else {
        ui::kv("Config file", &format!("{} (not found, using defaults)", path.display()));
    }

    let config = ctx.config()?;
    println!();
    ui::kv("host", &config.host);
    ui::kv("api_version", &config.api_version);
    ui::kv("timeout_secs", &config.timeout_secs.to_string());
    ui::kv(
        "ignore_missing_property",
        &config.reconcile.ignore_missing_property.to_string(),
    );
    ui::kv("ignore_casing", &config.reconcile.ignore_casing.to_string());

    if !config.headers.is_empty() {
        println!();
        ui::info("headers");
        for (key, value) in &config.headers {
            ui::kv(key, &ui::mask(value));
        }
    }

    println!();
    ui::dim(&format!(
        "Set {} to use a different config directory.",
        paths::ENV_CONFIG_DIR
    ));
    Ok(())
}

fn init(force: bool) -> Result<()> {
    let path = Config::path()?;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default().save_to(&path)?;
    ui::success(&format!("Wrote {}", path.display()));
    Ok(())
}
