//! Error kinds for scene mutations.
//!
//! None of these are fatal: the mutation that produced one is abandoned,
//! the store is left untouched, and the caller logs the condition.

use crate::id::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// A referenced id is missing from the scene store.
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Node construction constraints were violated.
    #[error("invalid node configuration: {0}")]
    InvalidConfig(String),

    /// A reparent/reorder onto a target that cannot accept the nodes.
    #[error("cannot reparent onto {target}: {reason}")]
    InvalidReparent { target: NodeId, reason: &'static str },

    /// An add would break id uniqueness.
    #[error("node {0} already exists")]
    DuplicateId(NodeId),

    /// Editor configuration text could not be parsed.
    #[error("editor config: {0}")]
    Config(String),

    /// A clipboard payload could not be encoded or decoded.
    #[error("clipboard payload: {0}")]
    Clipboard(String),
}

pub type SceneResult<T> = Result<T, SceneError>;
