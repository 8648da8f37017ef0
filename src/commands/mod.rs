pub mod config;
pub mod json;
pub mod refs;
pub mod remote;

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read a file, or stdin when the path is `-`
pub(crate) fn read_text(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Could not read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

/// Read and parse a JSON document
pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Pretty-print a JSON value to stdout
pub(crate) fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
