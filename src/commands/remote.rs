//! Remote read and list commands

use anyhow::Result;
use graphkit::{RequestOptions, parse_query_pairs};

use super::print_json;
use crate::Context;
use crate::cli::RemoteArgs;

/// Request options: configured deadline plus `--query` pairs
pub(crate) fn request_options(ctx: &Context, query: &[String]) -> Result<RequestOptions> {
    let config = ctx.config()?;
    Ok(config
        .request_options()
        .query_parameters(parse_query_pairs(query)?))
}

pub fn read(ctx: &Context, args: &RemoteArgs) -> Result<()> {
    let client = ctx.config()?.client()?;
    let options = request_options(ctx, &args.query)?;
    let body = client.read(&args.url, &options)?;
    print_json(&body)
}

pub fn list(ctx: &Context, args: &RemoteArgs, ids: bool) -> Result<()> {
    let client = ctx.config()?.client()?;
    let options = request_options(ctx, &args.query)?;

    if ids {
        for id in client.list_ref_ids(&args.url, &options)? {
            println!("{id}");
        }
        return Ok(());
    }

    let body = client.list(&args.url, &options)?;
    if let Some(items) = body.get(reconcile::VALUE_KEY).and_then(|v| v.as_array()) {
        log::info!("{}: {} item(s)", args.url, items.len());
    }
    print_json(&body)
}
