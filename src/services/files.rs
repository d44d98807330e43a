use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{with_io_context, with_parse_context};

/// Read and deserialize a JSON document
pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path, data_type: &str) -> Result<T> {
    let display = path.display().to_string();
    let json = with_io_context(fs::read_to_string(path), "read", &display)?;
    let data = with_parse_context(serde_json::from_str(&json), data_type)?;

    info!("Loaded {} from {}", data_type, display);
    Ok(data)
}

/// Serialize as pretty JSON to a file, or stdout when no path is given
pub fn write_json<T: Serialize>(path: Option<&Path>, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;

    match path {
        Some(path) => {
            let display = path.display().to_string();
            with_io_context(fs::write(path, json), "write", &display)?;
            info!("Saved report to {}", display);
        }
        None => println!("{}", json),
    }

    Ok(())
}
