//! Offline reconciliation commands: normalize, merge, update, diff

use anyhow::{Context as _, Result};
use colored::Colorize;
use reconcile::{UpdateOptions, Value};
use similar::{ChangeTag, TextDiff};
use std::path::Path;

use super::{print_json, read_json, read_text};
use crate::cli::{PairArgs, ReconcileArgs};
use crate::{Context, ui};

pub fn normalize(file: &Path) -> Result<()> {
    let text = read_text(file)?;
    let canonical = reconcile::normalize_strict(&text)
        .with_context(|| format!("Could not normalize {}", file.display()))?;
    println!("{canonical}");
    Ok(())
}

pub fn merge(pair: &PairArgs) -> Result<()> {
    let (old, new) = read_pair(pair)?;
    print_json(&reconcile::merge(&old, &new))
}

pub fn update(ctx: &Context, pair: &PairArgs, args: &ReconcileArgs) -> Result<()> {
    let options = options(ctx, args)?;
    let (old, new) = read_pair(pair)?;
    print_json(&reconcile::update(&old, &new, &options))
}

pub fn diff(ctx: &Context, pair: &PairArgs, args: &ReconcileArgs, paths: bool, text: bool) -> Result<()> {
    let options = options(ctx, args)?;
    let (old, new) = read_pair(pair)?;

    if text {
        for line in line_changes(&old, &new)? {
            match line.chars().next() {
                Some('-') => println!("{}", line.red()),
                Some('+') => println!("{}", line.green()),
                _ => println!("{line}"),
            }
        }
    }

    let Some(patch) = reconcile::diff(&old, &new, &options) else {
        if !ctx.quiet {
            ui::success("No changes");
        }
        return Ok(());
    };

    if text {
        return Ok(());
    }
    if paths {
        for path in reconcile::changed_paths(&patch) {
            println!("{path}");
        }
        return Ok(());
    }
    print_json(&patch)
}

/// Reconciliation options: config defaults, switched on by flags
fn options(ctx: &Context, args: &ReconcileArgs) -> Result<UpdateOptions> {
    let defaults = ctx.config()?.reconcile;
    Ok(UpdateOptions::new()
        .ignore_missing_property(defaults.ignore_missing_property || args.ignore_missing)
        .ignore_casing(defaults.ignore_casing || args.ignore_casing))
}

fn read_pair(pair: &PairArgs) -> Result<(Value, Value)> {
    if pair.old.as_os_str() == "-" && pair.new.as_os_str() == "-" {
        anyhow::bail!("Only one of OLD and NEW can be read from stdin");
    }
    Ok((read_json(&pair.old)?, read_json(&pair.new)?))
}

/// Changed lines between the pretty-printed documents, prefixed `-`/`+`
fn line_changes(old: &Value, new: &Value) -> Result<Vec<String>> {
    let old_text = serde_json::to_string_pretty(old)? + "\n";
    let new_text = serde_json::to_string_pretty(new)? + "\n";
    let diff = TextDiff::from_lines(&old_text, &new_text);

    Ok(diff
        .iter_all_changes()
        .filter_map(|change| match change.tag() {
            ChangeTag::Delete => Some(format!("- {}", change.value().trim_end())),
            ChangeTag::Insert => Some(format!("+ {}", change.value().trim_end())),
            ChangeTag::Equal => None,
        })
        .collect())
}
