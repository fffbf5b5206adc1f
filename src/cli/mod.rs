mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "stagec", version, about = "Futarchy action staging compiler")]
struct Cli {
    /// Path to an existing plan store
    #[arg(short = 'd', long = "db", global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new plan store initialised with schema and PRAGMAs
    New {
        /// Project name or path for the database file
        name: String,
    },
    /// Manage per-network package addresses
    Packages {
        #[command(subcommand)]
        command: PackagesCommand,
    },
    /// Inspect the action catalog
    Actions {
        #[command(subcommand)]
        command: ActionsCommand,
    },
    /// Check action ids against a workflow context
    Validate {
        #[arg(long = "context")]
        context: String,
        #[arg(required = true, value_name = "ACTION")]
        actions: Vec<String>,
    },
    /// Compile actions into a call sequence rooted at a fresh action builder
    Stage {
        #[arg(long = "context")]
        context: String,
        /// JSON plan: {"steps": [{"action", "values", "typeArgs"}]}
        #[arg(long = "plan", value_name = "FILE", conflicts_with = "action")]
        plan: Option<PathBuf>,
        /// Single action id to stage
        #[arg(long = "action", required_unless_present = "plan")]
        action: Option<String>,
        /// JSON object of parameter values for --action
        #[arg(long = "values", value_name = "FILE", requires = "action")]
        values: Option<PathBuf>,
        /// Parameter value as name=value (repeatable). Vectors are comma separated
        /// and `~`/`null` mean none; use --values for strings holding commas or
        /// a literal `null`
        #[arg(long = "arg", value_name = "NAME=VALUE", requires = "action")]
        args: Vec<String>,
        /// Type argument for the staging function (repeatable, in order)
        #[arg(long = "type-arg", value_name = "TYPE", requires = "action")]
        type_args: Vec<String>,
        #[command(flatten)]
        packages: PackageSource,
        /// Register the compiled plan under NAME
        #[arg(long = "save", value_name = "NAME")]
        save: Option<String>,
    },
    /// Emit one fixed proposal lifecycle call
    Dispatch {
        #[arg(value_enum)]
        op: DispatchOp,
        /// JSON object with daoAccount, proposal, escrow, spotPool
        #[arg(long = "objects", value_name = "FILE")]
        objects: PathBuf,
        #[arg(long = "asset-type", value_name = "TYPE")]
        asset_type: String,
        #[arg(long = "stable-type", value_name = "TYPE")]
        stable_type: String,
        /// Winning outcome index (required by begin-execution and execute)
        #[arg(long = "outcome")]
        outcome: Option<u64>,
        /// Clock object (defaults to 0x6)
        #[arg(long = "clock", value_name = "ADDR")]
        clock: Option<String>,
        #[command(flatten)]
        packages: PackageSource,
    },
    /// Inspect stored plans
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },
}

/// Where package addresses come from: a JSON file or the store's network table.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct PackageSource {
    #[arg(long = "packages", value_name = "FILE")]
    file: Option<PathBuf>,
    #[arg(long = "network", value_name = "NETWORK")]
    network: Option<String>,
}

#[derive(Subcommand)]
enum PackagesCommand {
    /// Record the deployed address of a package on a network
    Set {
        #[arg(long = "network")]
        network: String,
        /// Package id, e.g. accountActions
        package: String,
        address: String,
    },
    /// Print the recorded addresses of a network as JSON
    Show {
        #[arg(long = "network")]
        network: String,
    },
    /// Report packages the catalog needs but the network lacks
    Check {
        #[arg(long = "network")]
        network: String,
    },
}

#[derive(Subcommand)]
enum ActionsCommand {
    /// List catalog actions, optionally filtered
    List {
        #[arg(long = "context")]
        context: Option<String>,
        #[arg(long = "package")]
        package: Option<String>,
        /// Only actions taking a parameter of this type, e.g. `option<u64>`
        #[arg(long = "param-type", value_name = "TYPE")]
        param_type: Option<String>,
    },
    /// Show one action's parameters and contexts
    Show { id: String },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// List saved plans
    List {
        #[arg(long = "prefix")]
        prefix: Option<String>,
    },
    /// Print a saved plan as JSON
    Show { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum DispatchOp {
    EndTrading,
    FinalizeProposal,
    ForceRejectOnTimeout,
    BeginExecution,
    /// Begin execution and consume the executable in one sequence
    Execute,
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::New { name } => commands::cmd_new(&name),
        Command::Packages { command } => {
            let store_path = commands::require_store_path(cli.store.as_deref())?;
            commands::cmd_packages(store_path, command)
        }
        Command::Actions { command } => commands::cmd_actions(command),
        Command::Validate { context, actions } => commands::cmd_validate(&context, &actions),
        Command::Stage {
            context,
            plan,
            action,
            values,
            args,
            type_args,
            packages,
            save,
        } => {
            let request = commands::StageRequest {
                context,
                plan,
                action,
                values,
                args,
                type_args,
                save,
            };
            commands::cmd_stage(cli.store.as_deref(), &packages, request)
        }
        Command::Dispatch {
            op,
            objects,
            asset_type,
            stable_type,
            outcome,
            clock,
            packages,
        } => {
            let request = commands::DispatchRequest {
                op,
                objects,
                asset_type,
                stable_type,
                outcome,
                clock,
            };
            commands::cmd_dispatch(cli.store.as_deref(), &packages, request)
        }
        Command::Plan { command } => {
            let store_path = commands::require_store_path(cli.store.as_deref())?;
            commands::cmd_plan(store_path, command)
        }
    }
}
