//! Fixed-order calls that drive proposal state directly instead of staging
//! into an action builder.
//!
//! The engine enforces timing windows and winner conditions; these helpers
//! only check that every required object reference is present and keep the
//! protocol's argument order.

use serde::Deserialize;
use smallvec::smallvec;

use crate::address::{Address, CLOCK};
use crate::encode::encode;
use crate::error::{Result, StageError};
use crate::package::{PackageConfig, PackageId};
use crate::sequence::{CallArg, CallDescriptor, CallSequence};
use crate::types::TypeTag;
use crate::value::ArgValue;

/// On-ledger objects a proposal operation may touch.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProposalObjects {
    pub dao_account: Option<Address>,
    pub proposal: Option<Address>,
    pub escrow: Option<Address>,
    pub spot_pool: Option<Address>,
}

/// Asset and stable coin types the proposal markets are instantiated with.
#[derive(Clone, Debug)]
pub struct CoinTypes {
    pub asset: String,
    pub stable: String,
}

impl CoinTypes {
    fn type_arguments(&self) -> smallvec::SmallVec<[String; 2]> {
        smallvec![self.asset.clone(), self.stable.clone()]
    }
}

/// Names of the fixed operations, as reported in errors and the CLI.
pub mod op {
    pub const NEW_ACTION_BUILDER: &str = "new_action_builder";
    pub const END_TRADING: &str = "end_trading";
    pub const FINALIZE_PROPOSAL: &str = "finalize_proposal";
    pub const FORCE_REJECT_ON_TIMEOUT: &str = "force_reject_on_timeout";
    pub const BEGIN_EXECUTION: &str = "begin_execution";
    pub const FINALIZE_EXECUTION: &str = "finalize_execution";
}

fn require(slot: Option<Address>, operation: &str, name: &str) -> Result<CallArg> {
    slot.map(CallArg::Object)
        .ok_or_else(|| StageError::MissingParameter {
            action: operation.to_string(),
            param: name.to_string(),
        })
}

fn clock_arg(clock: Option<Address>) -> CallArg {
    CallArg::Object(clock.unwrap_or(CLOCK))
}

fn fixed_call(
    sequence: &mut CallSequence,
    config: &PackageConfig,
    package: PackageId,
    module: &str,
    function: &str,
    type_arguments: smallvec::SmallVec<[String; 2]>,
    arguments: Vec<CallArg>,
) -> Result<CallArg> {
    let target = config.target(package, module, function)?;
    tracing::debug!(%target, args = arguments.len(), "dispatching fixed call");
    sequence.push(CallDescriptor {
        target,
        type_arguments,
        arguments,
    })
}

/// Instantiate the action builder that staged actions chain from.
pub fn new_action_builder(sequence: &mut CallSequence, config: &PackageConfig) -> Result<CallArg> {
    fixed_call(
        sequence,
        config,
        PackageId::AccountProtocol,
        "action_spec_builder",
        "new",
        smallvec::SmallVec::new(),
        Vec::new(),
    )
}

/// Close the trading window once the trading period has elapsed.
pub fn end_trading(
    sequence: &mut CallSequence,
    config: &PackageConfig,
    objects: &ProposalObjects,
    coins: &CoinTypes,
    clock: Option<Address>,
) -> Result<CallArg> {
    let arguments = vec![
        require(objects.proposal, op::END_TRADING, "proposal")?,
        require(objects.escrow, op::END_TRADING, "escrow")?,
        clock_arg(clock),
    ];
    fixed_call(
        sequence,
        config,
        PackageId::FutarchyGovernance,
        "proposal_lifecycle",
        "end_trading",
        coins.type_arguments(),
        arguments,
    )
}

/// Settle the winning outcome of an ended trading period and open its execution window.
pub fn finalize_proposal(
    sequence: &mut CallSequence,
    config: &PackageConfig,
    objects: &ProposalObjects,
    coins: &CoinTypes,
    clock: Option<Address>,
) -> Result<CallArg> {
    let arguments = lifecycle_arguments(objects, op::FINALIZE_PROPOSAL, clock)?;
    fixed_call(
        sequence,
        config,
        PackageId::FutarchyGovernance,
        "proposal_lifecycle",
        "finalize_proposal_market",
        coins.type_arguments(),
        arguments,
    )
}

/// Fall back to the reject outcome when the execution window expired unused.
pub fn force_reject_on_timeout(
    sequence: &mut CallSequence,
    config: &PackageConfig,
    objects: &ProposalObjects,
    coins: &CoinTypes,
    clock: Option<Address>,
) -> Result<CallArg> {
    let arguments = lifecycle_arguments(objects, op::FORCE_REJECT_ON_TIMEOUT, clock)?;
    fixed_call(
        sequence,
        config,
        PackageId::FutarchyGovernance,
        "proposal_lifecycle",
        "force_reject_on_timeout",
        coins.type_arguments(),
        arguments,
    )
}

/// Start executing the approved intent of `outcome_index`; returns the executable handle.
pub fn begin_execution(
    sequence: &mut CallSequence,
    config: &PackageConfig,
    objects: &ProposalObjects,
    coins: &CoinTypes,
    outcome_index: u64,
    clock: Option<Address>,
) -> Result<CallArg> {
    let arguments = vec![
        require(objects.dao_account, op::BEGIN_EXECUTION, "daoAccount")?,
        require(objects.proposal, op::BEGIN_EXECUTION, "proposal")?,
        require(objects.escrow, op::BEGIN_EXECUTION, "escrow")?,
        CallArg::Pure(encode(&ArgValue::from(outcome_index), TypeTag::U64)?),
        clock_arg(clock),
    ];
    fixed_call(
        sequence,
        config,
        PackageId::FutarchyGovernance,
        "ptb_executor",
        "begin_execution",
        coins.type_arguments(),
        arguments,
    )
}

/// Consume the executable produced by [`begin_execution`].
pub fn finalize_execution(
    sequence: &mut CallSequence,
    config: &PackageConfig,
    objects: &ProposalObjects,
    coins: &CoinTypes,
    executable: CallArg,
    clock: Option<Address>,
) -> Result<CallArg> {
    let arguments = vec![
        require(objects.dao_account, op::FINALIZE_EXECUTION, "daoAccount")?,
        executable,
        clock_arg(clock),
    ];
    fixed_call(
        sequence,
        config,
        PackageId::FutarchyGovernance,
        "ptb_executor",
        "finalize_execution",
        coins.type_arguments(),
        arguments,
    )
}

fn lifecycle_arguments(
    objects: &ProposalObjects,
    operation: &str,
    clock: Option<Address>,
) -> Result<Vec<CallArg>> {
    Ok(vec![
        require(objects.dao_account, operation, "daoAccount")?,
        require(objects.proposal, operation, "proposal")?,
        require(objects.escrow, operation, "escrow")?,
        require(objects.spot_pool, operation, "spotPool")?,
        clock_arg(clock),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PackageConfig {
        PackageConfig::new()
            .with(PackageId::AccountProtocol, Address::new([0xaa; 32]))
            .with(PackageId::FutarchyGovernance, Address::new([0xbb; 32]))
    }

    fn objects() -> ProposalObjects {
        ProposalObjects {
            dao_account: Some(Address::new([1; 32])),
            proposal: Some(Address::new([2; 32])),
            escrow: Some(Address::new([3; 32])),
            spot_pool: Some(Address::new([4; 32])),
        }
    }

    fn coins() -> CoinTypes {
        CoinTypes {
            asset: "0xa::asset::ASSET".to_string(),
            stable: "0xb::usdc::USDC".to_string(),
        }
    }

    #[test]
    fn clock_defaults_to_sentinel() -> Result<()> {
        let mut seq = CallSequence::new();
        end_trading(&mut seq, &config(), &objects(), &coins(), None)?;
        let call = &seq.calls()[0];
        assert_eq!(call.arguments.last(), Some(&CallArg::Object(CLOCK)));
        assert!(call.target.ends_with("::proposal_lifecycle::end_trading"));
        assert_eq!(call.type_arguments.len(), 2);

        let custom = Address::new([9; 32]);
        end_trading(&mut seq, &config(), &objects(), &coins(), Some(custom))?;
        assert_eq!(seq.calls()[1].arguments.last(), Some(&CallArg::Object(custom)));
        Ok(())
    }

    #[test]
    fn lifecycle_calls_keep_protocol_order() -> Result<()> {
        let mut seq = CallSequence::new();
        finalize_proposal(&mut seq, &config(), &objects(), &coins(), None)?;
        let objs = objects();
        assert_eq!(
            seq.calls()[0].arguments,
            vec![
                CallArg::Object(objs.dao_account.unwrap()),
                CallArg::Object(objs.proposal.unwrap()),
                CallArg::Object(objs.escrow.unwrap()),
                CallArg::Object(objs.spot_pool.unwrap()),
                CallArg::Object(CLOCK),
            ]
        );
        Ok(())
    }

    #[test]
    fn missing_object_is_reported_by_name() {
        let mut seq = CallSequence::new();
        let mut objs = objects();
        objs.spot_pool = None;
        let err = force_reject_on_timeout(&mut seq, &config(), &objs, &coins(), None).unwrap_err();
        match err {
            StageError::MissingParameter { action, param } => {
                assert_eq!(action, op::FORCE_REJECT_ON_TIMEOUT);
                assert_eq!(param, "spotPool");
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(seq.is_empty());
    }

    #[test]
    fn execution_chains_through_executable_handle() -> Result<()> {
        let mut seq = CallSequence::new();
        let executable = begin_execution(&mut seq, &config(), &objects(), &coins(), 1, None)?;
        assert_eq!(executable, CallArg::Result(0));
        assert_eq!(
            seq.calls()[0].arguments[3],
            CallArg::Pure(encode(&ArgValue::Uint(1), TypeTag::U64)?)
        );
        finalize_execution(&mut seq, &config(), &objects(), &coins(), executable.clone(), None)?;
        assert_eq!(seq.calls()[1].arguments[1], executable);
        Ok(())
    }

    #[test]
    fn builder_needs_protocol_package() -> Result<()> {
        let mut seq = CallSequence::new();
        let handle = new_action_builder(&mut seq, &config())?;
        assert_eq!(handle, CallArg::Result(0));
        assert!(seq.calls()[0].arguments.is_empty());

        let err = new_action_builder(&mut seq, &PackageConfig::new()).unwrap_err();
        assert!(matches!(
            err,
            StageError::Configuration {
                package: PackageId::AccountProtocol
            }
        ));
        Ok(())
    }

    #[test]
    fn objects_deserialize_from_camel_case_json() -> Result<()> {
        let objs: ProposalObjects =
            serde_json::from_str(r#"{"daoAccount": "0x1", "proposal": "0x2"}"#)?;
        assert_eq!(objs.dao_account, Some(Address::parse("0x1")?));
        assert!(objs.escrow.is_none());
        assert!(serde_json::from_str::<ProposalObjects>(r#"{"pool": "0x1"}"#).is_err());
        Ok(())
    }
}
