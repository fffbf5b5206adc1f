//! Static catalog of stageable actions and the read-only registry over it.
//!
//! Every action stages one action spec into an in-progress action builder: the
//! entry point is `<package>::<staging_module>::<staging_function>` and takes
//! the builder first, then the declared parameters in order. Adding an action
//! is a new row here; the encoder needs no change as long as the parameter
//! types already exist in [`TypeTag`].

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::context::Context;
use crate::error::{Result, StageError};
use crate::package::PackageId;
use crate::types::TypeTag;

/// One declared parameter of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamDef {
    pub name: &'static str,
    pub ty: TypeTag,
    pub optional: bool,
}

const fn req(name: &'static str, ty: TypeTag) -> ParamDef {
    ParamDef {
        name,
        ty,
        optional: false,
    }
}

const fn opt(name: &'static str, ty: TypeTag) -> ParamDef {
    ParamDef {
        name,
        ty,
        optional: true,
    }
}

/// Immutable description of a stageable action.
#[derive(Clone, Copy, Debug)]
pub struct ActionDefinition {
    pub id: &'static str,
    pub package: PackageId,
    pub staging_module: &'static str,
    pub staging_function: &'static str,
    pub params: &'static [ParamDef],
    pub contexts: &'static [Context],
    /// Generic parameters the staging function is instantiated with.
    pub type_params: &'static [&'static str],
    pub description: &'static str,
}

impl ActionDefinition {
    pub fn param(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|param| param.name == name)
    }

    pub fn supports(&self, context: Context) -> bool {
        self.contexts.contains(&context)
    }
}

const BOTH: &[Context] = &[Context::Launchpad, Context::Proposal];
const LAUNCHPAD: &[Context] = &[Context::Launchpad];
const PROPOSAL: &[Context] = &[Context::Proposal];

/// Built-in action catalog, in the order actions are listed to users.
pub static ACTIONS: &[ActionDefinition] = &[
    // account actions
    ActionDefinition {
        id: "create_stream",
        package: PackageId::AccountActions,
        staging_module: "stream_init_actions",
        staging_function: "add_create_stream_spec",
        params: &[
            req("vault_name", TypeTag::String),
            req("beneficiary", TypeTag::Address),
            req("amount_per_iteration", TypeTag::U64),
            req("start_time", TypeTag::U64),
            req("iterations_total", TypeTag::U64),
            req("iteration_period_ms", TypeTag::U64),
            req("cliff_time", TypeTag::OptionU64),
            req("claim_window_ms", TypeTag::OptionU64),
            req("max_per_withdrawal", TypeTag::U64),
            opt("is_transferable", TypeTag::Bool),
            opt("is_cancellable", TypeTag::Bool),
        ],
        contexts: BOTH,
        type_params: &["CoinType"],
        description: "Create a vesting stream paid out of a vault",
    },
    ActionDefinition {
        id: "cancel_stream",
        package: PackageId::AccountActions,
        staging_module: "vault_actions",
        staging_function: "add_cancel_stream_spec",
        params: &[
            req("vault_name", TypeTag::String),
            req("stream_id", TypeTag::Id),
        ],
        contexts: PROPOSAL,
        type_params: &["CoinType"],
        description: "Cancel a cancellable vault stream",
    },
    ActionDefinition {
        id: "vault_deposit",
        package: PackageId::AccountActions,
        staging_module: "vault_actions",
        staging_function: "add_deposit_spec",
        params: &[
            req("vault_name", TypeTag::String),
            req("amount", TypeTag::U64),
        ],
        contexts: BOTH,
        type_params: &["CoinType"],
        description: "Deposit coins into a named vault",
    },
    ActionDefinition {
        id: "vault_spend",
        package: PackageId::AccountActions,
        staging_module: "vault_actions",
        staging_function: "add_spend_spec",
        params: &[
            req("vault_name", TypeTag::String),
            req("amount", TypeTag::U64),
            req("spend_all", TypeTag::Bool),
        ],
        contexts: BOTH,
        type_params: &["CoinType"],
        description: "Withdraw coins from a named vault",
    },
    ActionDefinition {
        id: "currency_mint",
        package: PackageId::AccountActions,
        staging_module: "currency_actions",
        staging_function: "add_mint_spec",
        params: &[req("amount", TypeTag::U64)],
        contexts: BOTH,
        type_params: &["CoinType"],
        description: "Mint coins with the locked treasury cap",
    },
    ActionDefinition {
        id: "currency_burn",
        package: PackageId::AccountActions,
        staging_module: "currency_actions",
        staging_function: "add_burn_spec",
        params: &[req("amount", TypeTag::U64)],
        contexts: PROPOSAL,
        type_params: &["CoinType"],
        description: "Burn coins with the locked treasury cap",
    },
    ActionDefinition {
        id: "update_currency_metadata",
        package: PackageId::AccountActions,
        staging_module: "currency_actions",
        staging_function: "add_update_metadata_spec",
        params: &[
            req("symbol", TypeTag::OptionString),
            req("name", TypeTag::OptionString),
            req("description", TypeTag::OptionString),
            req("icon_url", TypeTag::OptionString),
        ],
        contexts: PROPOSAL,
        type_params: &["CoinType"],
        description: "Update coin metadata fields; null leaves a field unchanged",
    },
    ActionDefinition {
        id: "transfer",
        package: PackageId::AccountActions,
        staging_module: "transfer_actions",
        staging_function: "add_transfer_spec",
        params: &[req("recipient", TypeTag::Address)],
        contexts: BOTH,
        type_params: &[],
        description: "Transfer the object produced by the previous action",
    },
    ActionDefinition {
        id: "transfer_to_sender",
        package: PackageId::AccountActions,
        staging_module: "transfer_actions",
        staging_function: "add_transfer_to_sender_spec",
        params: &[],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Transfer the previous action's object to the executing sender",
    },
    ActionDefinition {
        id: "memo",
        package: PackageId::AccountActions,
        staging_module: "memo_actions",
        staging_function: "add_emit_memo_spec",
        params: &[req("message", TypeTag::String)],
        contexts: BOTH,
        type_params: &[],
        description: "Emit a memo event",
    },
    ActionDefinition {
        id: "package_upgrade",
        package: PackageId::AccountActions,
        staging_module: "package_upgrade_actions",
        staging_function: "add_upgrade_spec",
        params: &[
            req("package_name", TypeTag::String),
            req("digest", TypeTag::VectorU8),
        ],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Authorize an upgrade of a managed package to the given digest",
    },
    // futarchy config actions
    ActionDefinition {
        id: "set_proposals_enabled",
        package: PackageId::FutarchyActions,
        staging_module: "config_actions",
        staging_function: "add_set_proposals_enabled_spec",
        params: &[req("enabled", TypeTag::Bool)],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Pause or resume proposal creation",
    },
    ActionDefinition {
        id: "update_name",
        package: PackageId::FutarchyActions,
        staging_module: "config_actions",
        staging_function: "add_update_name_spec",
        params: &[req("new_name", TypeTag::String)],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Rename the DAO",
    },
    ActionDefinition {
        id: "update_metadata",
        package: PackageId::FutarchyActions,
        staging_module: "config_actions",
        staging_function: "add_metadata_update_spec",
        params: &[
            req("name", TypeTag::OptionString),
            req("icon_url", TypeTag::OptionString),
            req("description", TypeTag::OptionString),
        ],
        contexts: BOTH,
        type_params: &[],
        description: "Update DAO metadata fields",
    },
    ActionDefinition {
        id: "update_trading_params",
        package: PackageId::FutarchyActions,
        staging_module: "config_actions",
        staging_function: "add_trading_params_update_spec",
        params: &[
            req("min_asset_amount", TypeTag::OptionU64),
            req("min_stable_amount", TypeTag::OptionU64),
            req("review_period_ms", TypeTag::OptionU64),
            req("trading_period_ms", TypeTag::OptionU64),
            req("amm_total_fee_bps", TypeTag::OptionU64),
        ],
        contexts: BOTH,
        type_params: &[],
        description: "Update market trading parameters",
    },
    ActionDefinition {
        id: "update_twap_config",
        package: PackageId::FutarchyActions,
        staging_module: "config_actions",
        staging_function: "add_twap_config_update_spec",
        params: &[
            req("start_delay", TypeTag::OptionU64),
            req("step_max", TypeTag::OptionU64),
            req("initial_observation", TypeTag::OptionU128),
            req("threshold", TypeTag::OptionU128),
        ],
        contexts: BOTH,
        type_params: &[],
        description: "Update TWAP oracle configuration",
    },
    ActionDefinition {
        id: "update_governance",
        package: PackageId::FutarchyActions,
        staging_module: "config_actions",
        staging_function: "add_governance_update_spec",
        params: &[
            req("max_outcomes", TypeTag::OptionU64),
            req("max_actions_per_outcome", TypeTag::OptionU64),
            req("proposal_fee_per_outcome", TypeTag::OptionU64),
            req("accept_new_proposals", TypeTag::OptionBool),
        ],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Update governance limits and fees",
    },
    ActionDefinition {
        id: "update_conditional_metadata",
        package: PackageId::FutarchyActions,
        staging_module: "config_actions",
        staging_function: "add_conditional_metadata_update_spec",
        params: &[
            req("use_outcome_index", TypeTag::OptionBool),
            req("outcome_labels", TypeTag::VectorString),
        ],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Update naming of conditional outcome coins",
    },
    ActionDefinition {
        id: "create_dissolution_capability",
        package: PackageId::FutarchyActions,
        staging_module: "dissolution_actions",
        staging_function: "add_create_dissolution_capability_spec",
        params: &[],
        contexts: LAUNCHPAD,
        type_params: &["AssetType"],
        description: "Create the capability that allows a failed raise to dissolve",
    },
    ActionDefinition {
        id: "create_pool_with_mint",
        package: PackageId::FutarchyActions,
        staging_module: "liquidity_init_actions",
        staging_function: "add_create_pool_with_mint_spec",
        params: &[
            req("vault_name", TypeTag::String),
            req("asset_amount", TypeTag::U64),
            req("stable_amount", TypeTag::U64),
            req("fee_bps", TypeTag::U64),
        ],
        contexts: LAUNCHPAD,
        type_params: &["AssetType", "StableType", "LpType"],
        description: "Seed the spot pool from raised funds and freshly minted asset",
    },
    // governance actions
    ActionDefinition {
        id: "end_trading",
        package: PackageId::FutarchyGovernanceActions,
        staging_module: "governance_intents",
        staging_function: "add_end_trading_spec",
        params: &[req("proposal_id", TypeTag::Id)],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Close the trading window of a live proposal",
    },
    ActionDefinition {
        id: "set_quotas",
        package: PackageId::FutarchyGovernanceActions,
        staging_module: "quota_actions",
        staging_function: "add_set_quotas_spec",
        params: &[
            req("users", TypeTag::VectorAddress),
            req("quota_amount", TypeTag::U64),
            req("quota_period_ms", TypeTag::U64),
            req("reduced_fee", TypeTag::U64),
            opt("sponsor_quota_amount", TypeTag::U64),
        ],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Grant proposal quotas to a set of addresses",
    },
    ActionDefinition {
        id: "sweep_intents",
        package: PackageId::FutarchyGovernanceActions,
        staging_module: "governance_intents",
        staging_function: "add_sweep_intents_spec",
        params: &[req("intent_keys", TypeTag::VectorString)],
        contexts: PROPOSAL,
        type_params: &[],
        description: "Remove expired intents from the account",
    },
    // oracle actions
    ActionDefinition {
        id: "create_oracle_grant",
        package: PackageId::FutarchyOracleActions,
        staging_module: "oracle_init_actions",
        staging_function: "add_create_oracle_grant_spec",
        params: &[
            req("tiers", TypeTag::Raw),
            req("use_relative_pricing", TypeTag::Bool),
            req("launchpad_multiplier", TypeTag::U64),
            req("earliest_execution_offset_ms", TypeTag::U64),
            req("expiry_years", TypeTag::U64),
            req("cancelable", TypeTag::Bool),
            req("description", TypeTag::String),
            req("metadata", TypeTag::OptionVectorU8),
            opt("price_mode", TypeTag::U8),
        ],
        contexts: BOTH,
        type_params: &["AssetType", "StableType"],
        description: "Create a price-conditional mint grant (tiers are pre-encoded)",
    },
    ActionDefinition {
        id: "cancel_grant",
        package: PackageId::FutarchyOracleActions,
        staging_module: "oracle_actions",
        staging_function: "add_cancel_grant_spec",
        params: &[req("grant_id", TypeTag::Id)],
        contexts: PROPOSAL,
        type_params: &["AssetType", "StableType"],
        description: "Cancel an outstanding oracle grant",
    },
];

/// Read-only index over an action catalog.
pub struct ActionRegistry {
    actions: &'static [ActionDefinition],
    by_id: HashMap<&'static str, usize>,
}

static REGISTRY: Lazy<ActionRegistry> =
    Lazy::new(|| ActionRegistry::new(ACTIONS).expect("built-in action catalog is well-formed"));

/// Process-wide registry over the built-in catalog.
pub fn registry() -> &'static ActionRegistry {
    &REGISTRY
}

impl ActionRegistry {
    /// Index a catalog, rejecting duplicate ids and non-trailing optional parameters.
    pub fn new(actions: &'static [ActionDefinition]) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(actions.len());
        for (idx, action) in actions.iter().enumerate() {
            check_definition(action)?;
            if by_id.insert(action.id, idx).is_some() {
                return Err(StageError::InvalidCatalog(format!(
                    "duplicate action id `{}`",
                    action.id
                )));
            }
        }
        Ok(Self { actions, by_id })
    }

    pub fn get(&self, id: &str) -> Result<&'static ActionDefinition> {
        self.lookup(id)
            .ok_or_else(|| StageError::UnknownAction(id.to_string()))
    }

    pub fn lookup(&self, id: &str) -> Option<&'static ActionDefinition> {
        let actions = self.actions;
        self.by_id.get(id).map(|idx| &actions[*idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ActionDefinition> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Ids legal in `context`, in catalog order.
    pub fn ids_for(&self, context: Context) -> Vec<&'static str> {
        self.iter()
            .filter(|action| action.supports(context))
            .map(|action| action.id)
            .collect()
    }

    pub fn launchpad_action_ids(&self) -> Vec<&'static str> {
        self.ids_for(Context::Launchpad)
    }

    pub fn proposal_action_ids(&self) -> Vec<&'static str> {
        self.ids_for(Context::Proposal)
    }

    /// True when at least one action stages into `package`.
    pub fn references(&self, package: PackageId) -> bool {
        self.iter().any(|action| action.package == package)
    }
}

fn check_definition(action: &ActionDefinition) -> Result<()> {
    let invalid = |reason: String| StageError::InvalidCatalog(format!("`{}`: {reason}", action.id));
    if action.id.is_empty() || action.staging_module.is_empty() || action.staging_function.is_empty()
    {
        return Err(invalid("id, module and function must be non-empty".to_string()));
    }
    if action.contexts.is_empty() {
        return Err(invalid("no context tags".to_string()));
    }
    let mut seen_optional = None;
    for param in action.params {
        if action.params.iter().filter(|p| p.name == param.name).count() > 1 {
            return Err(invalid(format!("duplicate parameter `{}`", param.name)));
        }
        match (seen_optional, param.optional) {
            (Some(previous), false) => {
                return Err(invalid(format!(
                    "required parameter `{}` follows optional `{previous}`",
                    param.name
                )));
            }
            (None, true) => seen_optional = Some(param.name),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_well_formed() {
        let registry = registry();
        assert_eq!(registry.len(), ACTIONS.len());
        for action in ACTIONS {
            assert!(std::ptr::eq(registry.lookup(action.id).unwrap(), action));
        }
    }

    #[test]
    fn end_trading_is_proposal_only() {
        let registry = registry();
        assert!(registry.proposal_action_ids().contains(&"end_trading"));
        assert!(!registry.launchpad_action_ids().contains(&"end_trading"));
    }

    #[test]
    fn context_lists_keep_catalog_order() {
        let ids = registry().launchpad_action_ids();
        let positions: Vec<usize> = ids
            .iter()
            .map(|id| ACTIONS.iter().position(|a| a.id == *id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.contains(&"create_dissolution_capability"));
    }

    #[test]
    fn unknown_action_is_reported() {
        let err = registry().get("launch_rockets").unwrap_err();
        assert!(matches!(err, StageError::UnknownAction(ref id) if id == "launch_rockets"));
    }

    static DUPLICATED: &[ActionDefinition] = &[
        ActionDefinition {
            id: "same",
            package: PackageId::AccountActions,
            staging_module: "m",
            staging_function: "f",
            params: &[],
            contexts: BOTH,
            type_params: &[],
            description: "",
        },
        ActionDefinition {
            id: "same",
            package: PackageId::FutarchyActions,
            staging_module: "m",
            staging_function: "g",
            params: &[],
            contexts: PROPOSAL,
            type_params: &[],
            description: "",
        },
    ];

    static OPTIONAL_IN_MIDDLE: &[ActionDefinition] = &[ActionDefinition {
        id: "gap",
        package: PackageId::AccountActions,
        staging_module: "m",
        staging_function: "f",
        params: &[opt("note", TypeTag::String), req("amount", TypeTag::U64)],
        contexts: BOTH,
        type_params: &[],
        description: "",
    }];

    #[test]
    fn registry_rejects_malformed_catalogs() {
        assert!(matches!(
            ActionRegistry::new(DUPLICATED),
            Err(StageError::InvalidCatalog(_))
        ));
        assert!(matches!(
            ActionRegistry::new(OPTIONAL_IN_MIDDLE),
            Err(StageError::InvalidCatalog(_))
        ));
    }
}
