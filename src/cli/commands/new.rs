use anyhow::Result;

use futarchy_stage::{create_store, derive_db_path};

pub(crate) fn cmd_new(name: &str) -> Result<()> {
    let path = derive_db_path(name);
    let conn = create_store(&path)?;
    drop(conn);
    println!("created plan store at {}", path.display());
    Ok(())
}
