//! Logical package identifiers and their per-network resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::catalog::ActionRegistry;
use crate::error::{Result, StageError};

/// Every package an action or dispatch helper can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PackageId {
    AccountProtocol,
    AccountActions,
    FutarchyActions,
    FutarchyGovernance,
    FutarchyGovernanceActions,
    FutarchyOracleActions,
}

impl PackageId {
    pub const ALL: [PackageId; 6] = [
        PackageId::AccountProtocol,
        PackageId::AccountActions,
        PackageId::FutarchyActions,
        PackageId::FutarchyGovernance,
        PackageId::FutarchyGovernanceActions,
        PackageId::FutarchyOracleActions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackageId::AccountProtocol => "accountProtocol",
            PackageId::AccountActions => "accountActions",
            PackageId::FutarchyActions => "futarchyActions",
            PackageId::FutarchyGovernance => "futarchyGovernance",
            PackageId::FutarchyGovernanceActions => "futarchyGovernanceActions",
            PackageId::FutarchyOracleActions => "futarchyOracleActions",
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageId {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self> {
        PackageId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| StageError::UnknownPackage(s.to_string()))
    }
}

/// Deployed address of each logical package on one network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageConfig {
    addresses: BTreeMap<PackageId, Address>,
}

impl PackageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, package: PackageId, address: Address) -> Self {
        self.addresses.insert(package, address);
        self
    }

    pub fn insert(&mut self, package: PackageId, address: Address) -> Option<Address> {
        self.addresses.insert(package, address)
    }

    /// Load a JSON object of the form `{"accountActions": "0x…", …}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Address of `package`; an absent entry is a configuration error.
    pub fn resolve(&self, package: PackageId) -> Result<Address> {
        self.addresses
            .get(&package)
            .copied()
            .ok_or(StageError::Configuration { package })
    }

    /// Fully-qualified entry point `<address>::<module>::<function>`.
    pub fn target(&self, package: PackageId, module: &str, function: &str) -> Result<String> {
        let address = self.resolve(package)?;
        Ok(format!("{address}::{module}::{function}"))
    }

    /// Catalog packages this config cannot resolve, in enumeration order.
    pub fn missing_for(&self, registry: &ActionRegistry) -> Vec<PackageId> {
        PackageId::ALL
            .into_iter()
            .filter(|package| registry.references(*package))
            .filter(|package| !self.addresses.contains_key(package))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PackageId, Address)> + '_ {
        self.addresses.iter().map(|(id, address)| (*id, *address))
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
