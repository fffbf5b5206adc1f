//! Workflow contexts and the pre-flight gate over action ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::ActionRegistry;
use crate::error::StageError;

/// Workflow category that decides which actions are legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    Launchpad,
    Proposal,
}

impl Context {
    pub fn as_str(self) -> &'static str {
        match self {
            Context::Launchpad => "launchpad",
            Context::Proposal => "proposal",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Context {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "launchpad" => Ok(Context::Launchpad),
            "proposal" => Ok(Context::Proposal),
            other => Err(StageError::UnknownContext(other.to_string())),
        }
    }
}

/// Outcome of validating a batch of action ids against one context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContextReport {
    pub valid: bool,
    /// Offending ids in input order.
    pub unsupported: Vec<String>,
}

/// Unknown ids are never supported.
pub fn is_supported(registry: &ActionRegistry, action_id: &str, context: Context) -> bool {
    registry
        .lookup(action_id)
        .is_some_and(|action| action.supports(context))
}

pub fn validate_all<S: AsRef<str>>(
    registry: &ActionRegistry,
    action_ids: &[S],
    context: Context,
) -> ContextReport {
    let unsupported: Vec<String> = action_ids
        .iter()
        .filter_map(|id| {
            let id: &str = id.as_ref();
            (!is_supported(registry, id, context)).then(|| id.to_string())
        })
        .collect();
    if !unsupported.is_empty() {
        tracing::debug!(%context, ?unsupported, "context validation rejected actions");
    }
    ContextReport {
        valid: unsupported.is_empty(),
        unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::registry;

    #[test]
    fn launchpad_rejects_proposal_only_action() {
        assert!(!is_supported(registry(), "end_trading", Context::Launchpad));
        assert!(is_supported(registry(), "end_trading", Context::Proposal));
        assert!(is_supported(registry(), "memo", Context::Launchpad));
        assert!(!is_supported(registry(), "no_such_action", Context::Proposal));
    }

    #[test]
    fn validate_all_partitions_in_order() {
        let ids = [
            "memo",
            "end_trading",
            "create_stream",
            "cancel_grant",
            "unknown",
            "vault_deposit",
        ];
        let report = validate_all(registry(), &ids, Context::Launchpad);
        assert!(!report.valid);
        assert_eq!(report.unsupported, vec!["end_trading", "cancel_grant", "unknown"]);
    }

    #[test]
    fn validate_all_accepts_clean_batch() {
        let ids = vec!["create_dissolution_capability".to_string(), "memo".to_string()];
        let report = validate_all(registry(), &ids, Context::Launchpad);
        assert_eq!(
            report,
            ContextReport {
                valid: true,
                unsupported: Vec::new()
            }
        );
        assert!(validate_all::<&str>(registry(), &[], Context::Proposal).valid);
    }

    #[test]
    fn context_names_parse() {
        assert_eq!("proposal".parse::<Context>().unwrap(), Context::Proposal);
        assert!(matches!(
            "dao".parse::<Context>(),
            Err(StageError::UnknownContext(_))
        ));
    }
}
