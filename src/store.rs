//! SQLite plan store: per-network package addresses, content-addressed call
//! sequences and a name index over them.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, DatabaseName, OpenFlags, OptionalExtension, params};

use crate::address::{Address, encode_hex};
use crate::error::{Result, StageError};
use crate::package::{PackageConfig, PackageId};
use crate::sequence::{CallSequence, digest_bytes};

/// Result of persisting a plan.
pub struct PlanStoreOutcome {
    pub cid: [u8; 32],
    pub inserted: bool,
}

/// One `name -> cid` row of the name index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameEntry {
    pub name: String,
    pub cid: [u8; 32],
}

pub fn derive_db_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(name);
    if path.extension().is_none() {
        path.set_extension("stage.db");
    }
    path
}

pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn create_store(path: &Path) -> Result<Connection> {
    ensure_parent_dirs(path)?;
    if path.exists() {
        return Err(StageError::Database {
            path: path.to_path_buf(),
            reason: "plan store already exists",
        });
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_READ_WRITE,
    )?;
    configure_pragmas(&conn)?;
    install_schema(&conn)?;
    Ok(conn)
}

pub fn open_store(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(StageError::Database {
            path: path.to_path_buf(),
            reason: "plan store not found",
        });
    }

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
    configure_pragmas(&conn)?;
    install_schema(&conn)?;
    Ok(conn)
}

pub fn configure_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(Some(DatabaseName::Main), "journal_mode", "WAL")?;
    conn.pragma_update(Some(DatabaseName::Main), "synchronous", "NORMAL")?;
    conn.pragma_update(Some(DatabaseName::Main), "temp_store", "MEMORY")?;
    Ok(())
}

pub fn install_schema(conn: &Connection) -> Result<()> {
    const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS object (
  cid   BLOB PRIMARY KEY,
  kind  TEXT NOT NULL,
  cbor  BLOB NOT NULL
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS name_index (
  scope TEXT NOT NULL,
  name  TEXT NOT NULL,
  cid   BLOB NOT NULL,
  PRIMARY KEY (scope, name)
);

CREATE TABLE IF NOT EXISTS package_address (
  network TEXT NOT NULL,
  package TEXT NOT NULL,
  address TEXT NOT NULL,
  PRIMARY KEY (network, package)
);

CREATE INDEX IF NOT EXISTS object_kind_idx ON object(kind);
"#;

    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn put_object(conn: &Connection, cid: &[u8; 32], kind: &str, cbor: &[u8]) -> Result<bool> {
    let rows = conn.execute(
        "INSERT OR IGNORE INTO object (cid, kind, cbor) VALUES (?1, ?2, ?3)",
        params![&cid[..], kind, cbor],
    )?;
    Ok(rows > 0)
}

pub fn load_object(conn: &Connection, cid: &[u8; 32], kind: &str) -> Result<Vec<u8>> {
    conn.query_row(
        "SELECT cbor FROM object WHERE cid = ?1 AND kind = ?2",
        params![&cid[..], kind],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StageError::ObjectNotFound(encode_hex(cid)))
}

pub fn put_name(conn: &Connection, scope: &str, name: &str, cid: &[u8; 32]) -> Result<()> {
    conn.execute(
        "INSERT INTO name_index (scope, name, cid) VALUES (?1, ?2, ?3)
         ON CONFLICT(scope, name) DO UPDATE SET cid = excluded.cid",
        params![scope, name, &cid[..]],
    )?;
    Ok(())
}

pub fn get_name(conn: &Connection, scope: &str, name: &str) -> Result<Option<[u8; 32]>> {
    let blob: Option<Vec<u8>> = conn
        .query_row(
            "SELECT cid FROM name_index WHERE scope = ?1 AND name = ?2",
            params![scope, name],
            |row| row.get(0),
        )
        .optional()?;
    blob.map(|bytes| cid_from_blob(&bytes)).transpose()
}

pub fn list_names(conn: &Connection, scope: &str, prefix: Option<&str>) -> Result<Vec<NameEntry>> {
    let mut stmt = conn.prepare(
        "SELECT name, cid FROM name_index WHERE scope = ?1 AND name LIKE ?2 ESCAPE '\\' ORDER BY name",
    )?;
    let pattern = format!("{}%", escape_like(prefix.unwrap_or("")));
    let rows = stmt.query_map(params![scope, pattern], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
    })?;
    let mut entries = Vec::new();
    for row in rows {
        let (name, blob) = row?;
        entries.push(NameEntry {
            name,
            cid: cid_from_blob(&blob)?,
        });
    }
    Ok(entries)
}

/// Persist a compiled sequence under the SHA-256 of its canonical encoding.
pub fn store_plan(conn: &Connection, sequence: &CallSequence) -> Result<PlanStoreOutcome> {
    let cbor = sequence.encode_cbor()?;
    let cid = digest_bytes(&cbor);
    let inserted = put_object(conn, &cid, "plan", &cbor)?;
    Ok(PlanStoreOutcome { cid, inserted })
}

pub fn load_plan(conn: &Connection, cid: &[u8; 32]) -> Result<CallSequence> {
    let cbor = load_object(conn, cid, "plan")?;
    CallSequence::decode_cbor(&cbor)
}

pub fn put_package_address(
    conn: &Connection,
    network: &str,
    package: PackageId,
    address: &Address,
) -> Result<()> {
    conn.execute(
        "INSERT INTO package_address (network, package, address) VALUES (?1, ?2, ?3)
         ON CONFLICT(network, package) DO UPDATE SET address = excluded.address",
        params![network, package.as_str(), address.to_string()],
    )?;
    Ok(())
}

/// Assemble the package config recorded for `network` (possibly empty).
pub fn load_package_config(conn: &Connection, network: &str) -> Result<PackageConfig> {
    let mut stmt =
        conn.prepare("SELECT package, address FROM package_address WHERE network = ?1")?;
    let rows = stmt.query_map(params![network], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut config = PackageConfig::new();
    for row in rows {
        let (package, address) = row?;
        config.insert(package.parse()?, Address::parse(&address)?);
    }
    Ok(config)
}

fn cid_from_blob(blob: &[u8]) -> Result<[u8; 32]> {
    <[u8; 32]>::try_from(blob).map_err(|_| StageError::ObjectNotFound(encode_hex(blob)))
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{CallArg, CallDescriptor};
    use smallvec::SmallVec;

    fn memory_store() -> Result<Connection> {
        let conn = Connection::open_in_memory()?;
        install_schema(&conn)?;
        Ok(conn)
    }

    fn plan() -> Result<CallSequence> {
        let mut seq = CallSequence::new();
        seq.push(CallDescriptor {
            target: format!("{}::action_spec_builder::new", Address::new([1; 32])),
            type_arguments: SmallVec::new(),
            arguments: Vec::new(),
        })?;
        seq.push(CallDescriptor {
            target: format!("{}::memo_actions::add_emit_memo_spec", Address::new([2; 32])),
            type_arguments: SmallVec::new(),
            arguments: vec![CallArg::Result(0)],
        })?;
        Ok(seq)
    }

    #[test]
    fn plans_are_content_addressed() -> Result<()> {
        let conn = memory_store()?;
        let seq = plan()?;
        let first = store_plan(&conn, &seq)?;
        assert!(first.inserted);
        assert_eq!(first.cid, seq.digest()?);
        let second = store_plan(&conn, &seq)?;
        assert!(!second.inserted);
        assert_eq!(load_plan(&conn, &first.cid)?, seq);
        Ok(())
    }

    #[test]
    fn missing_plan_is_reported() -> Result<()> {
        let conn = memory_store()?;
        let err = load_plan(&conn, &[7; 32]).unwrap_err();
        assert!(matches!(err, StageError::ObjectNotFound(_)));
        Ok(())
    }

    #[test]
    fn name_index_upserts_and_filters() -> Result<()> {
        let conn = memory_store()?;
        put_name(&conn, "plan", "launch/seed", &[1; 32])?;
        put_name(&conn, "plan", "launch_x", &[2; 32])?;
        put_name(&conn, "plan", "other", &[3; 32])?;
        put_name(&conn, "plan", "launch/seed", &[4; 32])?;
        assert_eq!(get_name(&conn, "plan", "launch/seed")?, Some([4; 32]));
        assert_eq!(get_name(&conn, "plan", "absent")?, None);

        let names: Vec<String> = list_names(&conn, "plan", Some("launch"))?
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["launch/seed", "launch_x"]);
        // `_` is matched literally, not as a wildcard.
        assert_eq!(list_names(&conn, "plan", Some("launch_"))?.len(), 1);
        Ok(())
    }

    #[test]
    fn package_addresses_are_per_network() -> Result<()> {
        let conn = memory_store()?;
        let a = Address::parse("0xa")?;
        let b = Address::parse("0xb")?;
        put_package_address(&conn, "testnet", PackageId::AccountActions, &a)?;
        put_package_address(&conn, "mainnet", PackageId::AccountActions, &b)?;
        put_package_address(&conn, "testnet", PackageId::AccountActions, &b)?;

        let testnet = load_package_config(&conn, "testnet")?;
        assert_eq!(testnet.resolve(PackageId::AccountActions)?, b);
        assert!(load_package_config(&conn, "devnet")?.is_empty());
        Ok(())
    }

    #[test]
    fn create_then_open_on_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = derive_db_path(dir.path().join("nested/plans").to_str().unwrap());
        assert!(path.to_string_lossy().ends_with("plans.stage.db"));
        drop(create_store(&path)?);
        assert!(matches!(
            create_store(&path),
            Err(StageError::Database { .. })
        ));
        let conn = open_store(&path)?;
        let outcome = store_plan(&conn, &plan()?)?;
        assert!(outcome.inserted);
        Ok(())
    }
}
