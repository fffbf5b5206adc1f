//! Futarchy action registry and staging compiler: catalog lookups, package
//! resolution, canonical parameter encoding and call-sequence assembly.

pub mod address;
pub mod bcs;
pub mod catalog;
pub mod compiler;
pub mod context;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod package;
pub mod sequence;
pub mod store;
pub mod types;
pub mod value;

pub use address::{Address, CLOCK};
pub use catalog::{ActionDefinition, ActionRegistry, ParamDef, registry};
pub use compiler::{StageStep, build_call, compile, stage_batch};
pub use context::{Context, ContextReport, is_supported, validate_all};
pub use dispatch::{CoinTypes, ProposalObjects};
pub use encode::{EncodedValue, encode};
pub use error::{Result, StageError};
pub use package::{PackageConfig, PackageId};
pub use sequence::{CallArg, CallDescriptor, CallSequence};
pub use store::{
    NameEntry, PlanStoreOutcome, create_store, derive_db_path, get_name, list_names, load_plan,
    load_package_config, open_store, put_name, put_package_address, store_plan,
};
pub use types::TypeTag;
pub use value::{ArgValue, ValueMap, bind_json};
