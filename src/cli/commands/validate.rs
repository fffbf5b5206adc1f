use anyhow::{Result, bail};

use futarchy_stage::{Context, registry, validate_all};

pub(crate) fn cmd_validate(context: &str, actions: &[String]) -> Result<()> {
    let context: Context = context.parse()?;
    let report = validate_all(registry(), actions, context);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.valid {
        bail!(
            "{} of {} action(s) not supported in {context} context",
            report.unsupported.len(),
            actions.len()
        );
    }
    Ok(())
}
