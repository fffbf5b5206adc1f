use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use futarchy_stage::address::encode_hex;
use futarchy_stage::dispatch::new_action_builder;
use futarchy_stage::{
    ArgValue, CallSequence, Context, StageStep, bind_json, open_store, put_name, registry,
    stage_batch, store_plan,
};

use super::util::{load_config, parse_assignment, print_sequence, read_json, require_store_path};
use crate::cli::PackageSource;

pub(crate) struct StageRequest {
    pub context: String,
    pub plan: Option<PathBuf>,
    pub action: Option<String>,
    pub values: Option<PathBuf>,
    pub args: Vec<String>,
    pub type_args: Vec<String>,
    pub save: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    steps: Vec<PlanFileStep>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PlanFileStep {
    action: String,
    #[serde(default)]
    values: Map<String, JsonValue>,
    #[serde(default)]
    type_args: Vec<String>,
}

pub(crate) fn cmd_stage(
    store: Option<&Path>,
    packages: &PackageSource,
    request: StageRequest,
) -> Result<()> {
    let context: Context = request.context.parse()?;
    let steps = match (&request.plan, &request.action) {
        (Some(plan), _) => steps_from_plan(plan)?,
        (None, Some(action)) => vec![single_step(action, &request)?],
        (None, None) => bail!("specify --plan FILE or --action ID"),
    };
    let config = load_config(store, packages)?;

    let mut sequence = CallSequence::new();
    let builder = new_action_builder(&mut sequence, &config)?;
    stage_batch(registry(), context, &builder, &config, &steps, &mut sequence)?;
    print_sequence(&sequence)?;

    if let Some(name) = request.save {
        let conn = open_store(require_store_path(store)?)?;
        let outcome = store_plan(&conn, &sequence)?;
        put_name(&conn, "plan", &name, &outcome.cid)?;
        let cid_hex = encode_hex(&outcome.cid);
        if outcome.inserted {
            println!("saved plan `{name}` with cid {cid_hex}");
        } else {
            println!("plan `{name}` already present with cid {cid_hex}");
        }
    }
    Ok(())
}

fn steps_from_plan(path: &Path) -> Result<Vec<StageStep>> {
    let plan: PlanFile = serde_json::from_value(read_json(path)?)?;
    if plan.steps.is_empty() {
        bail!("plan {} has no steps", path.display());
    }
    plan.steps
        .into_iter()
        .map(|step| -> Result<StageStep> {
            let mut staged = StageStep::new(step.action);
            // Unknown ids are left unbound so the context gate reports them together.
            if let Some(action) = registry().lookup(&staged.action) {
                staged.values = bind_json(action, &step.values)?;
            }
            staged.type_args = step.type_args;
            Ok(staged)
        })
        .collect()
}

fn single_step(action_id: &str, request: &StageRequest) -> Result<StageStep> {
    let mut step = StageStep::new(action_id);
    step.type_args = request.type_args.clone();
    let Some(action) = registry().lookup(action_id) else {
        return Ok(step);
    };

    if let Some(path) = &request.values {
        let json = read_json(path)?;
        let object = json
            .as_object()
            .ok_or_else(|| anyhow!("{} must hold a JSON object", path.display()))?;
        step.values = bind_json(action, object)?;
    }
    for entry in &request.args {
        let (name, text) = parse_assignment(entry)?;
        let Some(param) = action.param(name) else {
            tracing::warn!(action = action.id, param = name, "ignoring undeclared parameter");
            continue;
        };
        let value = ArgValue::parse_text(text, param.ty).map_err(|err| err.for_param(name))?;
        step.values.insert(name.to_string(), value);
    }
    Ok(step)
}
