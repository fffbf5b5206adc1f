mod actions;
mod dispatch;
mod new;
mod packages;
mod plan;
mod stage;
mod util;
mod validate;

pub(crate) use actions::cmd_actions;
pub(crate) use dispatch::{DispatchRequest, cmd_dispatch};
pub(crate) use new::cmd_new;
pub(crate) use packages::cmd_packages;
pub(crate) use plan::cmd_plan;
pub(crate) use stage::{StageRequest, cmd_stage};
pub(crate) use util::require_store_path;
pub(crate) use validate::cmd_validate;
