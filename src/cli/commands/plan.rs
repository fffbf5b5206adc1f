use std::path::Path;

use anyhow::{Result, anyhow};

use futarchy_stage::address::decode_hex;
use futarchy_stage::{get_name, load_plan, open_store};

use super::util::{list_scope, print_sequence};
use crate::cli::PlanCommand;

pub(crate) fn cmd_plan(store: &Path, command: PlanCommand) -> Result<()> {
    let conn = open_store(store)?;
    match command {
        PlanCommand::List { prefix } => {
            list_scope(&conn, "plan", prefix.as_deref(), "no plans saved")?;
        }
        PlanCommand::Show { name } => {
            let cid = match get_name(&conn, "plan", &name)? {
                Some(cid) => cid,
                None => cid_from_hex(&name).ok_or_else(|| anyhow!("plan `{name}` not found"))?,
            };
            let sequence = load_plan(&conn, &cid)?;
            print_sequence(&sequence)?;
        }
    }
    Ok(())
}

/// Accept a raw 64-digit cid where a plan name is expected.
fn cid_from_hex(text: &str) -> Option<[u8; 32]> {
    decode_hex(text).and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
}
