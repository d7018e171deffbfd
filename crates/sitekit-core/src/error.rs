//! Error handling for SiteKit
//!
//! Errors are grouped by how the caller is expected to react:
//! - Geometry errors (insufficient vertices, degenerate input): the gesture is a no-op
//! - Edit errors (protected targets, invalid session transitions): rejected, state unchanged
//! - Connectivity errors (measurement or persistence delegate unreachable): degraded mode
//! - Scene errors (unknown ids, missing boundary)
//!
//! None of these are fatal; every failure is local and recoverable by
//! retrying the user gesture.

use thiserror::Error;

use crate::data::{ObjectId, PersistedId, SceneKey, ShapeId};

/// Geometry error type
///
/// Raised when an operation would produce geometry that violates the
/// shape invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Not enough vertices for the shape kind
    #[error("{kind} needs at least {required} vertices, got {actual}")]
    InsufficientVertices {
        /// Shape kind name ("polygon" or "corridor").
        kind: String,
        /// Minimum vertex count for that kind.
        required: usize,
        /// The vertex count the operation would have produced.
        actual: usize,
    },

    /// Polygon has (near) zero area or repeated vertices only
    #[error("Degenerate polygon: {reason}")]
    DegeneratePolygon {
        /// Why the polygon is degenerate.
        reason: String,
    },

    /// No edge lies close enough to the pointer to insert a vertex
    #[error("No edge within {tolerance_px}px of the pointer (nearest {nearest_px:.1}px)")]
    NoEdgeWithinTolerance {
        /// Distance to the nearest edge in pixels.
        nearest_px: f64,
        /// Configured pick tolerance in pixels.
        tolerance_px: f64,
    },

    /// Vertex handle index out of range
    #[error("Vertex handle {index} out of range ({len} handles)")]
    UnknownHandle {
        /// The requested handle index.
        index: usize,
        /// Number of live handles.
        len: usize,
    },

    /// Scale factor must be finite and positive
    #[error("Invalid scale factor {0}")]
    InvalidScale(f64),

    /// Extrusion height must be finite and non-negative
    #[error("Invalid extrusion height {0}")]
    InvalidHeight(f64),

    /// Corridor width must be finite and positive
    #[error("Invalid corridor width {0}")]
    InvalidWidth(f64),

    /// The attribute does not exist on this shape kind
    #[error("{attribute} does not apply to a {kind}")]
    KindMismatch {
        /// Attribute name ("height" or "width").
        attribute: String,
        /// Shape kind name.
        kind: String,
    },

    /// A coordinate or length is not a finite number
    #[error("Non-finite value for {0}")]
    NonFinite(String),
}

/// Edit session error type
///
/// Represents violations of the edit state machine and of the
/// protected-entity rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// No edit session is active
    #[error("No edit session is active")]
    NoSession,

    /// Another target is already being edited
    #[error("{current} is already being edited; stop that session first")]
    SessionActive {
        /// The target of the active session.
        current: SceneKey,
    },

    /// The session was opened read-only
    #[error("{target} is read-only in this session")]
    ReadOnly {
        /// The read-only target.
        target: SceneKey,
    },

    /// The target is protected (boundary region or flagged shape)
    #[error("{target} is protected")]
    Protected {
        /// The protected target.
        target: SceneKey,
    },

    /// The operation does not apply to the session's target kind
    #[error("Operation '{operation}' does not apply to {target}")]
    WrongTarget {
        /// Operation name.
        operation: String,
        /// The session target.
        target: SceneKey,
    },

    /// Invalid state transition
    #[error("Invalid edit transition from {current} to {requested}")]
    InvalidTransition {
        /// The current mode name.
        current: String,
        /// The requested mode name.
        requested: String,
    },

    /// A drawing session is not collecting points
    #[error("No drawing in progress")]
    NotDrawing,
}

/// Connectivity error type
///
/// The remote measurement service or persistence backend could not be
/// reached. Callers surface a degraded flag instead of a number.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectivityError {
    /// Request timed out
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Delegate could not be reached
    #[error("Service unreachable: {reason}")]
    Unreachable {
        /// The reason the delegate is unreachable.
        reason: String,
    },

    /// Backend answered with a failure
    #[error("Persistence failure for {key}: {reason}")]
    SaveFailed {
        /// The object whose save failed.
        key: SceneKey,
        /// The backend's reason.
        reason: String,
    },

    /// Stored data could not be decoded
    #[error("Malformed payload: {reason}")]
    Malformed {
        /// The decode failure.
        reason: String,
    },
}

/// Scene lookup error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Shape id not present in the scene
    #[error("Unknown shape {0}")]
    UnknownShape(ShapeId),

    /// Object id not present in the scene
    #[error("Unknown object {0}")]
    UnknownObject(ObjectId),

    /// No boundary region has been loaded
    #[error("Scene has no boundary region")]
    MissingBoundary,

    /// Persisted record refers to an id that is not loaded
    #[error("Unknown persisted id {0}")]
    UnknownPersistedId(PersistedId),
}

/// Main error type for SiteKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Edit error
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Connectivity error
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    /// Scene error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Connectivity(ConnectivityError::Timeout { .. })
        )
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }

    /// Check if this is an edit/invariant error
    pub fn is_edit_error(&self) -> bool {
        matches!(self, Error::Edit(_))
    }

    /// Check if this is a connectivity error
    pub fn is_connectivity_error(&self) -> bool {
        matches!(self, Error::Connectivity(_))
    }

    /// Check if the target was protected or read-only
    pub fn is_protection_error(&self) -> bool {
        matches!(
            self,
            Error::Edit(EditError::Protected { .. }) | Error::Edit(EditError::ReadOnly { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
