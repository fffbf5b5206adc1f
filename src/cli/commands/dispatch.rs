use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use futarchy_stage::dispatch::{
    begin_execution, end_trading, finalize_execution, finalize_proposal, force_reject_on_timeout,
};
use futarchy_stage::{Address, CallSequence, CoinTypes, ProposalObjects};

use super::util::{load_config, print_sequence, read_json};
use crate::cli::{DispatchOp, PackageSource};

pub(crate) struct DispatchRequest {
    pub op: DispatchOp,
    pub objects: PathBuf,
    pub asset_type: String,
    pub stable_type: String,
    pub outcome: Option<u64>,
    pub clock: Option<String>,
}

pub(crate) fn cmd_dispatch(
    store: Option<&Path>,
    packages: &PackageSource,
    request: DispatchRequest,
) -> Result<()> {
    let objects: ProposalObjects = serde_json::from_value(read_json(&request.objects)?)?;
    let clock = request.clock.as_deref().map(Address::parse).transpose()?;
    let coins = CoinTypes {
        asset: request.asset_type,
        stable: request.stable_type,
    };
    let config = load_config(store, packages)?;

    let mut sequence = CallSequence::new();
    match request.op {
        DispatchOp::EndTrading => {
            end_trading(&mut sequence, &config, &objects, &coins, clock)?;
        }
        DispatchOp::FinalizeProposal => {
            finalize_proposal(&mut sequence, &config, &objects, &coins, clock)?;
        }
        DispatchOp::ForceRejectOnTimeout => {
            force_reject_on_timeout(&mut sequence, &config, &objects, &coins, clock)?;
        }
        DispatchOp::BeginExecution => {
            let outcome = required_outcome("begin-execution", request.outcome)?;
            begin_execution(&mut sequence, &config, &objects, &coins, outcome, clock)?;
        }
        DispatchOp::Execute => {
            let outcome = required_outcome("execute", request.outcome)?;
            let executable =
                begin_execution(&mut sequence, &config, &objects, &coins, outcome, clock)?;
            finalize_execution(&mut sequence, &config, &objects, &coins, executable, clock)?;
        }
    }
    print_sequence(&sequence)
}

/// The winning outcome is a protocol choice; it is never defaulted.
fn required_outcome(op: &str, outcome: Option<u64>) -> Result<u64> {
    match outcome {
        Some(index) => Ok(index),
        None => bail!("--outcome is required for {op}"),
    }
}
