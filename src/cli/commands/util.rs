use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result, anyhow, bail};
use rusqlite::Connection;

use futarchy_stage::address::encode_hex;
use futarchy_stage::{CallSequence, PackageConfig, list_names, load_package_config, open_store};

use crate::cli::PackageSource;

pub(crate) fn require_store_path(path: Option<&Path>) -> Result<&Path> {
    match path {
        Some(p) => Ok(p),
        None => bail!("specify --db PATH for this command"),
    }
}

/// Resolve package addresses from `--packages FILE` or the store's `--network` table.
pub(crate) fn load_config(store: Option<&Path>, source: &PackageSource) -> Result<PackageConfig> {
    if let Some(file) = &source.file {
        return PackageConfig::from_json_file(file)
            .with_context(|| format!("reading package config {}", file.display()));
    }
    let Some(network) = &source.network else {
        bail!("specify --packages FILE or --network NAME");
    };
    let conn = open_store(require_store_path(store)?)?;
    let config = load_package_config(&conn, network)?;
    if config.is_empty() {
        bail!("no package addresses recorded for network `{network}`");
    }
    Ok(config)
}

/// Split a `name=value` CLI assignment.
pub(crate) fn parse_assignment(entry: &str) -> Result<(&str, &str)> {
    let (name, value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid argument `{entry}`; expected name=value"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("parameter name cannot be empty in `{entry}`");
    }
    Ok((name, value.trim()))
}

pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub(crate) fn print_sequence(sequence: &CallSequence) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(sequence)?);
    println!("digest: {}", sequence.digest_hex()?);
    Ok(())
}

pub(crate) fn list_scope(
    conn: &Connection,
    scope: &str,
    prefix: Option<&str>,
    empty_msg: &str,
) -> Result<()> {
    let entries = list_names(conn, scope, prefix)?;
    if entries.is_empty() {
        println!("{empty_msg}");
        return Ok(());
    }

    for entry in entries {
        println!("{} -> {}", entry.name, encode_hex(&entry.cid));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_split_on_first_equals() -> Result<()> {
        assert_eq!(parse_assignment("message=a=b")?, ("message", "a=b"));
        assert_eq!(parse_assignment(" amount = 10 ")?, ("amount", "10"));
        assert!(parse_assignment("amount").is_err());
        assert!(parse_assignment("=10").is_err());
        Ok(())
    }

    #[test]
    fn network_source_needs_a_store() {
        let source = PackageSource {
            file: None,
            network: Some("testnet".to_string()),
        };
        let err = load_config(None, &source).unwrap_err();
        assert!(err.to_string().contains("--db"));
    }
}
