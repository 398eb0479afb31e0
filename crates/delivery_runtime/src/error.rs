use delivery_core::EngineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("a route for the current selection is already being generated")]
    SynthesisInFlight,
    #[error("route generation was superseded by a request for a newer selection")]
    Superseded,
}
