//! Error types for the dispatch engine.
//!
//! Every error here is recoverable: a rejected command leaves the engine in
//! the state it was in before the call.

use thiserror::Error;

use crate::registry::LocationId;
use crate::selection::Role;

/// Failure reported by a [`crate::synthesis::RouteSynthesizer`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    #[error("at least 2 locations are required to build a route, got {found}")]
    InsufficientLocations { found: usize },
    #[error("route synthesis unavailable: {0}")]
    Unavailable(String),
}

/// Rejected engine command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("location {location} is already assigned to {bound_to}")]
    InvalidSelection { location: LocationId, bound_to: Role },
    #[error("location {0} is not in the registry")]
    UnknownLocation(LocationId),
    #[error("at least 2 locations must be selected, got {selected}")]
    InsufficientLocations { selected: usize },
    #[error("route synthesis failed: {0}")]
    SynthesisFailure(#[from] SynthesisError),
    #[error("no route has been generated")]
    NoRoute,
    #[error("selection changed during route generation (revision {requested}, now {current})")]
    StaleSelection { requested: u64, current: u64 },
}

/// Invalid configuration or catalog input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    #[error("tick increment must be finite and positive, got {0}")]
    InvalidTickIncrement(f64),
    #[error("duplicate location id {0}")]
    DuplicateLocation(LocationId),
    #[error("location {0} has non-finite coordinates")]
    InvalidCoordinates(LocationId),
    #[error("failed to parse location catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
