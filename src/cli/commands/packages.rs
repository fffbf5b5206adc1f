use std::path::Path;

use anyhow::{Result, bail};

use futarchy_stage::{
    Address, PackageId, load_package_config, open_store, put_package_address, registry,
};

use crate::cli::PackagesCommand;

/// Packages the fixed dispatch calls need regardless of the catalog.
const FIXED_PACKAGES: [PackageId; 2] = [PackageId::AccountProtocol, PackageId::FutarchyGovernance];

pub(crate) fn cmd_packages(store: &Path, command: PackagesCommand) -> Result<()> {
    let conn = open_store(store)?;
    match command {
        PackagesCommand::Set {
            network,
            package,
            address,
        } => {
            let package: PackageId = package.parse()?;
            let address = Address::parse(&address)?;
            put_package_address(&conn, &network, package, &address)?;
            println!("{network}: {package} -> {address}");
        }
        PackagesCommand::Show { network } => {
            let config = load_package_config(&conn, &network)?;
            if config.is_empty() {
                println!("no package addresses recorded for network `{network}`");
            } else {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
        PackagesCommand::Check { network } => {
            let config = load_package_config(&conn, &network)?;
            let mut missing = config.missing_for(registry());
            for package in FIXED_PACKAGES {
                if config.resolve(package).is_err() && !missing.contains(&package) {
                    missing.push(package);
                }
            }
            if missing.is_empty() {
                println!("network `{network}` resolves every package");
                return Ok(());
            }
            for package in &missing {
                println!("missing {package}");
            }
            bail!(
                "network `{network}` is missing {} package address(es)",
                missing.len()
            );
        }
    }
    Ok(())
}
