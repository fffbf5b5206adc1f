//! Error taxonomy shared by the registry, encoder, compiler and plan store.

use std::path::PathBuf;

use thiserror::Error;

use crate::context::Context;
use crate::package::PackageId;
use crate::types::TypeTag;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("package config has no address for `{package}`")]
    Configuration { package: PackageId },

    #[error("action `{action}` is missing required parameter `{param}`")]
    MissingParameter { action: String, param: String },

    #[error("parameter `{param}` expects {expected}, got {found}")]
    TypeMismatch {
        param: String,
        expected: TypeTag,
        found: String,
    },

    #[error("unsupported type tag `{0}`")]
    UnsupportedType(String),

    #[error("actions not supported in {context} context: {}", unsupported.join(", "))]
    ContextMismatch {
        context: Context,
        unsupported: Vec<String>,
    },

    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("unknown package `{0}`")]
    UnknownPackage(String),

    #[error("unknown context `{0}`; expected launchpad or proposal")]
    UnknownContext(String),

    #[error("invalid address `{input}`: {reason}")]
    InvalidAddress { input: String, reason: &'static str },

    #[error("invalid action catalog: {0}")]
    InvalidCatalog(String),

    #[error("call sequence cannot hold more than {} calls", u16::MAX)]
    SequenceFull,

    #[error("{reason}: {}", path.display())]
    Database { path: PathBuf, reason: &'static str },

    #[error("object `{0}` not found in plan store")]
    ObjectNotFound(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cbor(#[from] serde_cbor::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StageError {
    /// Attach the parameter name to a mismatch raised below the compiler.
    pub fn for_param(self, name: &str) -> Self {
        match self {
            StageError::TypeMismatch {
                expected, found, ..
            } => StageError::TypeMismatch {
                param: name.to_string(),
                expected,
                found,
            },
            other => other,
        }
    }

    pub(crate) fn mismatch(expected: TypeTag, found: impl Into<String>) -> Self {
        StageError::TypeMismatch {
            param: "value".to_string(),
            expected,
            found: found.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StageError>;
