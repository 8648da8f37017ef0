//! Reference collection commands: list, plan, sync

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use graphkit::collection::{base_collection_url, validate_collection_url};
use graphkit::{Client, CollectionPlan, Error, ErrorCategory, RequestOptions};
use std::fs;

use super::remote::request_options;
use crate::cli::{RefsArgs, RefsCommand};
use crate::progress::BarProgress;
use crate::{Context, ui};

pub fn run(ctx: &Context, cmd: RefsCommand) -> Result<()> {
    match cmd {
        RefsCommand::List { url } => list(ctx, &url),
        RefsCommand::Plan(args) => plan(ctx, &args).map(|_| ()),
        RefsCommand::Sync { args, yes } => sync(ctx, &args, yes),
    }
}

fn list(ctx: &Context, url: &str) -> Result<()> {
    let client = ctx.config()?.client()?;
    let options = request_options(ctx, &[])?;
    for id in client.collection_ids(url, &options)? {
        println!("{id}");
    }
    Ok(())
}

/// Desired ids from `--id` and `--ids-file`, blank lines and `#` comments skipped
fn desired_ids(args: &RefsArgs) -> Result<Vec<String>> {
    let mut ids = args.ids.clone();
    if let Some(path) = &args.ids_file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        ids.extend(parse_id_lines(&content));
    }
    Ok(ids)
}

fn parse_id_lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

struct Planned {
    client: Client,
    options: RequestOptions,
    plan: CollectionPlan,
}

fn plan(ctx: &Context, args: &RefsArgs) -> Result<Planned> {
    validate_collection_url(&args.url)?;
    let client = ctx.config()?.client()?;
    let options = request_options(ctx, &[])?;
    let desired = desired_ids(args)?;

    let current = client.collection_ids(&args.url, &options)?;
    let plan = client.plan_collection(&args.url, current.as_slice(), desired.as_slice())?;

    ui::header(base_collection_url(&args.url));
    ui::kv("current", &current.len().to_string());
    ui::kv("desired", &desired.len().to_string());
    println!();

    if plan.is_empty() {
        ui::success("Collection is already in sync");
    } else {
        for id in &plan.to_add {
            ui::added(id);
        }
        for id in &plan.to_remove {
            ui::removed(id);
        }
        println!();
        ui::info(&format!(
            "{} to add, {} to remove",
            plan.to_add.len(),
            plan.to_remove.len()
        ));
    }

    Ok(Planned {
        client,
        options,
        plan,
    })
}

fn sync(ctx: &Context, args: &RefsArgs, yes: bool) -> Result<()> {
    let Planned {
        client,
        options,
        plan,
    } = plan(ctx, args)?;
    if plan.is_empty() {
        return Ok(());
    }

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Apply {} change(s)?", plan.len()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            ui::warn("Aborted");
            return Ok(());
        }
    }

    let mut progress = BarProgress::new(ctx.quiet);
    match client.apply_collection(&args.url, &plan, &options, &mut progress) {
        Ok(summary) => {
            ui::success(&format!(
                "Added {}, removed {}",
                summary.added, summary.removed
            ));
        }
        Err(Error::Sync(err)) => {
            for failure in &err.failures {
                ui::error(&format!(
                    "{} {}: {}",
                    failure.action,
                    failure.member,
                    failure.error
                ));
            }
            ui::dim(ErrorCategory::Partial.advice());
            bail!("Collection sync incomplete");
        }
        Err(err) => return Err(err.into()),
    }

    // Re-read so the printed state is what the server holds now
    let now = client.collection_ids(&args.url, &options)?;
    ui::header("Members");
    for id in &now {
        println!("  {}", id.dimmed());
    }
    Ok(())
}
