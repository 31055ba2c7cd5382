//! Error types for the diorama scene core
//!
//! Every fallible library operation returns [`Result`]. Most runtime
//! problems (missing registry, missing asset parts, missing camera anchors)
//! degrade gracefully instead of surfacing here.

use crate::gfx::scene::graph::NodeHandle;

#[derive(Debug, thiserror::Error)]
pub enum DioramaError {
    #[error("scene node {0} does not exist")]
    NodeNotFound(NodeHandle),

    #[error("attaching node {child} under {parent} would create a cycle")]
    CycleDetected { child: NodeHandle, parent: NodeHandle },

    #[error("the scene root cannot be removed")]
    RootRemoval,

    #[error("failed to load asset '{reference}': {reason}")]
    AssetLoad { reference: String, reason: String },

    #[error("no piece with id '{0}'")]
    UnknownPiece(String),

    #[error("piece id '{0}' is used more than once")]
    DuplicatePiece(String),

    #[error("selection did not settle after {passes} reconciliation passes")]
    SelectionDiverged { passes: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DioramaError>;
