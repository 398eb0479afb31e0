//! Route planning and animated delivery playback.
//!
//! Pick up to three locations from a [`registry::LocationRegistry`], synthesize
//! a route through them with a pluggable [`synthesis::RouteSynthesizer`], then
//! play the route back tick by tick with the [`engine::DispatchEngine`].

pub mod clock;
pub mod engine;
pub mod error;
pub mod registry;
pub mod route;
pub mod selection;
pub mod state;
pub mod synthesis;
pub mod systems;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use engine::{DispatchEngine, SynthesisRequest};
pub use error::{ConfigError, EngineError, SynthesisError};
pub use registry::{Location, LocationCategory, LocationId, LocationRegistry};
pub use route::{shareable_link, RouteDescriptor, TripDuration, Waypoint};
pub use selection::{Role, Selection};
pub use state::{PlaybackFrame, RunId, SimulationPhase, SimulationStats, StartOutcome};
