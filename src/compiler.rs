//! Staging compiler: turns a catalog action plus typed values into the next
//! call of an action-builder sequence.
//!
//! Arguments are bound positionally by the engine, so parameters are always
//! emitted in declared catalog order. A missing optional parameter drops its
//! slot entirely; a present `option<T>` value is encoded as some/none instead.

use smallvec::SmallVec;

use crate::catalog::{ActionDefinition, ActionRegistry};
use crate::context::{Context, validate_all};
use crate::encode::encode;
use crate::error::{Result, StageError};
use crate::package::PackageConfig;
use crate::sequence::{CallArg, CallDescriptor, CallSequence};
use crate::types::Shape;
use crate::value::{ArgValue, ValueMap};

/// One action of a batch, with its values and type arguments.
#[derive(Clone, Debug, Default)]
pub struct StageStep {
    pub action: String,
    pub values: ValueMap,
    pub type_args: Vec<String>,
}

impl StageStep {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn value(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn type_arg(mut self, ty: impl Into<String>) -> Self {
        self.type_args.push(ty.into());
        self
    }
}

/// Build the call for `action` without touching any sequence.
pub fn build_call(
    action: &ActionDefinition,
    builder: &CallArg,
    config: &PackageConfig,
    values: &ValueMap,
    type_args: &[String],
) -> Result<CallDescriptor> {
    let target = config.target(action.package, action.staging_module, action.staging_function)?;

    let mut arguments = Vec::with_capacity(action.params.len() + 1);
    arguments.push(builder.clone());
    for param in action.params {
        match values.get(param.name) {
            // Null means none only for `option<T>`; elsewhere it leaves an optional slot out.
            Some(ArgValue::Null)
                if param.optional && !matches!(param.ty.shape(), Shape::Option(_)) =>
            {
                continue;
            }
            Some(value) => {
                let encoded = encode(value, param.ty).map_err(|err| err.for_param(param.name))?;
                arguments.push(CallArg::Pure(encoded));
            }
            None if param.optional => continue,
            None => {
                return Err(StageError::MissingParameter {
                    action: action.id.to_string(),
                    param: param.name.to_string(),
                });
            }
        }
    }

    for name in values.keys() {
        if action.param(name).is_none() {
            tracing::warn!(action = action.id, param = %name, "ignoring undeclared parameter");
        }
    }
    if !action.type_params.is_empty() && type_args.len() != action.type_params.len() {
        tracing::warn!(
            action = action.id,
            expected = action.type_params.len(),
            supplied = type_args.len(),
            "type argument count differs from the staging function's generics"
        );
    }

    Ok(CallDescriptor {
        target,
        type_arguments: type_args.iter().cloned().collect::<SmallVec<_>>(),
        arguments,
    })
}

/// Compile `action` and append it to the caller's sequence.
pub fn compile(
    action: &ActionDefinition,
    builder: &CallArg,
    config: &PackageConfig,
    values: &ValueMap,
    type_args: &[String],
    sequence: &mut CallSequence,
) -> Result<CallDescriptor> {
    let call = build_call(action, builder, config, values, type_args)?;
    sequence.push(call.clone())?;
    tracing::debug!(
        action = action.id,
        target = %call.target,
        args = call.arguments.len(),
        "staged action"
    );
    Ok(call)
}

/// Stage a batch into one builder after gating it on `context`.
///
/// Every unsupported action is reported at once; nothing is appended unless
/// every step compiles.
pub fn stage_batch(
    registry: &ActionRegistry,
    context: Context,
    builder: &CallArg,
    config: &PackageConfig,
    steps: &[StageStep],
    sequence: &mut CallSequence,
) -> Result<Vec<CallDescriptor>> {
    let ids: Vec<&str> = steps.iter().map(|step| step.action.as_str()).collect();
    let report = validate_all(registry, &ids, context);
    if !report.valid {
        return Err(StageError::ContextMismatch {
            context,
            unsupported: report.unsupported,
        });
    }

    let calls = steps
        .iter()
        .map(|step| {
            let action = registry.get(&step.action)?;
            build_call(action, builder, config, &step.values, &step.type_args)
        })
        .collect::<Result<Vec<_>>>()?;
    sequence.extend(calls.clone())?;
    tracing::debug!(%context, staged = calls.len(), "staged batch");
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::catalog::{ParamDef, registry};
    use crate::package::PackageId;
    use crate::types::TypeTag;

    static SETTLE: ActionDefinition = ActionDefinition {
        id: "settle_outcome",
        package: PackageId::FutarchyGovernanceActions,
        staging_module: "governance_intents",
        staging_function: "add_settle_spec",
        params: &[
            ParamDef {
                name: "outcomeIndex",
                ty: TypeTag::U64,
                optional: false,
            },
            ParamDef {
                name: "note",
                ty: TypeTag::String,
                optional: true,
            },
        ],
        contexts: &[Context::Proposal],
        type_params: &[],
        description: "",
    };

    fn config() -> PackageConfig {
        PackageId::ALL
            .into_iter()
            .enumerate()
            .fold(PackageConfig::new(), |config, (idx, id)| {
                config.with(id, Address::new([idx as u8 + 1; 32]))
            })
    }

    fn values(pairs: &[(&str, ArgValue)]) -> ValueMap {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn required_parameter_is_encoded_after_builder() -> Result<()> {
        let mut seq = CallSequence::new();
        let builder = CallArg::Result(0);
        let call = compile(
            &SETTLE,
            &builder,
            &config(),
            &values(&[("outcomeIndex", 3u64.into())]),
            &[],
            &mut seq,
        )?;
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(call.arguments[0], builder);
        match &call.arguments[1] {
            CallArg::Pure(bytes) => assert_eq!(bytes.as_bytes(), &[3, 0, 0, 0, 0, 0, 0, 0]),
            other => panic!("expected pure argument, got {other:?}"),
        }
        assert!(call.type_arguments.is_empty());
        assert_eq!(seq.calls(), &[call]);
        Ok(())
    }

    #[test]
    fn missing_required_parameter_names_it() {
        let mut seq = CallSequence::new();
        let err = compile(
            &SETTLE,
            &CallArg::Result(0),
            &config(),
            &ValueMap::new(),
            &[],
            &mut seq,
        )
        .unwrap_err();
        match err {
            StageError::MissingParameter { action, param } => {
                assert_eq!(action, "settle_outcome");
                assert_eq!(param, "outcomeIndex");
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(seq.is_empty());
    }

    #[test]
    fn omitted_optional_drops_exactly_one_slot() -> Result<()> {
        let builder = CallArg::Result(0);
        let without = build_call(
            &SETTLE,
            &builder,
            &config(),
            &values(&[("outcomeIndex", 1u64.into())]),
            &[],
        )?;
        let with = build_call(
            &SETTLE,
            &builder,
            &config(),
            &values(&[("outcomeIndex", 1u64.into()), ("note", "why".into())]),
            &[],
        )?;
        assert_eq!(with.arguments.len(), without.arguments.len() + 1);
        Ok(())
    }

    #[test]
    fn mismatch_reports_parameter_name() {
        let err = build_call(
            &SETTLE,
            &CallArg::Result(0),
            &config(),
            &values(&[("outcomeIndex", "three".into())]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StageError::TypeMismatch { ref param, expected: TypeTag::U64, .. } if param == "outcomeIndex"
        ));
    }

    #[test]
    fn incomplete_config_fails_before_encoding() {
        let config = PackageConfig::new().with(PackageId::AccountActions, Address::new([1; 32]));
        let err = build_call(&SETTLE, &CallArg::Result(0), &config, &ValueMap::new(), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            StageError::Configuration {
                package: PackageId::FutarchyGovernanceActions
            }
        ));
    }

    #[test]
    fn parameters_follow_declared_order() -> Result<()> {
        let action = registry().get("vault_spend")?;
        // ValueMap iterates alphabetically; the catalog order must win.
        let call = build_call(
            action,
            &CallArg::Result(0),
            &config(),
            &values(&[
                ("spend_all", false.into()),
                ("amount", 9u64.into()),
                ("vault_name", "treasury".into()),
            ]),
            &["0x2::sui::SUI".to_string()],
        )?;
        let pure: Vec<&[u8]> = call
            .arguments
            .iter()
            .filter_map(|arg| match arg {
                CallArg::Pure(bytes) => Some(bytes.as_bytes()),
                _ => None,
            })
            .collect();
        assert_eq!(pure[0][0] as usize, "treasury".len());
        assert_eq!(pure[1], &[9, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(pure[2], &[0]);
        assert_eq!(call.type_arguments.as_slice(), &["0x2::sui::SUI".to_string()]);
        Ok(())
    }

    #[test]
    fn compiling_twice_is_identical() -> Result<()> {
        let mut seq = CallSequence::new();
        let builder = CallArg::Result(0);
        let vals = values(&[("outcomeIndex", 3u64.into()), ("note", "n".into())]);
        let first = compile(&SETTLE, &builder, &config(), &vals, &[], &mut seq)?;
        let second = compile(&SETTLE, &builder, &config(), &vals, &[], &mut seq)?;
        assert_eq!(first, second);
        assert_eq!(seq.len(), 2);

        let mut left = CallSequence::new();
        let mut right = CallSequence::new();
        compile(&SETTLE, &builder, &config(), &vals, &[], &mut left)?;
        compile(&SETTLE, &builder, &config(), &vals, &[], &mut right)?;
        assert_eq!(left.digest()?, right.digest()?);
        Ok(())
    }

    #[test]
    fn null_in_optional_scalar_slot_is_omitted() -> Result<()> {
        let action = registry().get("create_stream")?;
        let mut required = values(&[
            ("vault_name", "treasury".into()),
            ("beneficiary", "0x5".into()),
            ("amount_per_iteration", 10u64.into()),
            ("start_time", 0u64.into()),
            ("iterations_total", 4u64.into()),
            ("iteration_period_ms", 1_000u64.into()),
            ("cliff_time", ArgValue::Null),
            ("claim_window_ms", ArgValue::Null),
            ("max_per_withdrawal", 10u64.into()),
        ]);
        let builder = CallArg::Result(0);
        let bare = build_call(action, &builder, &config(), &required, &[])?;

        required.insert("is_transferable".to_string(), None::<bool>.into());
        let with_null = build_call(action, &builder, &config(), &required, &[])?;
        assert_eq!(with_null, bare);

        required.insert("is_transferable".to_string(), Some(true).into());
        let with_value = build_call(action, &builder, &config(), &required, &[])?;
        assert_eq!(with_value.arguments.len(), bare.arguments.len() + 1);
        Ok(())
    }

    #[test]
    fn every_catalog_target_is_well_formed() -> Result<()> {
        let config = config();
        for action in registry().iter() {
            let target =
                config.target(action.package, action.staging_module, action.staging_function)?;
            let parts: Vec<&str> = target.split("::").collect();
            assert_eq!(parts.len(), 3, "{target}");
            assert!(parts.iter().all(|part| !part.is_empty()));
            assert!(parts[0].starts_with("0x"));
        }
        Ok(())
    }

    #[test]
    fn batch_reports_every_unsupported_action() {
        let mut seq = CallSequence::new();
        let steps = [
            StageStep::new("memo").value("message", "gm"),
            StageStep::new("end_trading"),
            StageStep::new("cancel_grant"),
        ];
        let err = stage_batch(
            registry(),
            Context::Launchpad,
            &CallArg::Result(0),
            &config(),
            &steps,
            &mut seq,
        )
        .unwrap_err();
        match err {
            StageError::ContextMismatch {
                context,
                unsupported,
            } => {
                assert_eq!(context, Context::Launchpad);
                assert_eq!(unsupported, vec!["end_trading", "cancel_grant"]);
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(seq.is_empty());
    }

    #[test]
    fn batch_is_all_or_nothing() -> Result<()> {
        let mut seq = CallSequence::new();
        let builder = CallArg::Result(0);
        let broken = [
            StageStep::new("memo").value("message", "gm"),
            StageStep::new("currency_mint"),
        ];
        assert!(
            stage_batch(registry(), Context::Proposal, &builder, &config(), &broken, &mut seq)
                .is_err()
        );
        assert!(seq.is_empty());

        let fixed = [
            StageStep::new("memo").value("message", "gm"),
            StageStep::new("currency_mint")
                .value("amount", 1_000u64)
                .type_arg("0xabc::asset::ASSET"),
        ];
        let calls =
            stage_batch(registry(), Context::Proposal, &builder, &config(), &fixed, &mut seq)?;
        assert_eq!(calls.len(), 2);
        assert_eq!(seq.calls(), calls.as_slice());
        Ok(())
    }

    #[test]
    fn explicit_none_keeps_option_slot() -> Result<()> {
        let action = registry().get("update_governance")?;
        let call = build_call(
            action,
            &CallArg::Result(0),
            &config(),
            &values(&[
                ("max_outcomes", ArgValue::Null),
                ("max_actions_per_outcome", 5u64.into()),
                ("proposal_fee_per_outcome", ArgValue::Null),
                ("accept_new_proposals", true.into()),
            ]),
            &[],
        )?;
        assert_eq!(call.arguments.len(), 5);
        assert_eq!(call.arguments[1], CallArg::Pure(encode(&ArgValue::Null, TypeTag::OptionU64)?));
        Ok(())
    }
}
