//! Error types for the Unity asset graph engine
//!
//! Malformed or partial Unity text is ordinary input and never reaches this
//! type: parsers degrade to `None` or empty collections instead. What remains
//! are caller contract violations and host-side I/O.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for graph engine operations
pub type Result<T> = std::result::Result<T, UnityGraphError>;

/// Main error type for the graph engine and its host-side loader
#[derive(Error, Debug)]
pub enum UnityGraphError {
    /// IO errors when a host reads asset files
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The API was used in a way its contract forbids
    #[error("Caller misuse: {message}")]
    CallerMisuse { message: String },

    /// A component record handed to reconstruct does not belong to the asset
    #[error("Component '{component_id}' does not belong to asset '{asset_id}'")]
    ComponentMismatch {
        component_id: String,
        asset_id: String,
    },

    /// Reconstruct was called without any component records
    #[error("No components supplied for asset '{asset_id}'")]
    EmptyComponentList { asset_id: String },

    /// The export artifact could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The host loader refused a file above its configured size limit
    #[error("File {path:?} is {size} bytes, limit is {limit}")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// The host loader was asked to parse a kind that has no text parser
    #[error("Unsupported asset kind: {kind}")]
    UnsupportedAssetKind { kind: String },
}

impl UnityGraphError {
    /// Create a caller misuse error
    pub fn caller_misuse<S: Into<String>>(message: S) -> Self {
        Self::CallerMisuse {
            message: message.into(),
        }
    }

    /// Create a component mismatch error
    pub fn component_mismatch<S: Into<String>>(component_id: S, asset_id: S) -> Self {
        Self::ComponentMismatch {
            component_id: component_id.into(),
            asset_id: asset_id.into(),
        }
    }

    /// Create an empty component list error
    pub fn empty_components<S: Into<String>>(asset_id: S) -> Self {
        Self::EmptyComponentList {
            asset_id: asset_id.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization(message.into())
    }

    /// Create an unsupported asset kind error
    pub fn unsupported_kind<S: Into<String>>(kind: S) -> Self {
        Self::UnsupportedAssetKind { kind: kind.into() }
    }

    /// Whether this error reports an API contract violation rather than I/O
    pub fn is_caller_misuse(&self) -> bool {
        matches!(
            self,
            Self::CallerMisuse { .. }
                | Self::ComponentMismatch { .. }
                | Self::EmptyComponentList { .. }
        )
    }
}
