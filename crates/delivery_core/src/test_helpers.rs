//! Test helpers for common test setup and utilities.
//!
//! Fixtures reference the default Texas catalog so tests across crates agree
//! on ids and coordinates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::clock::PlaybackConfig;
use crate::engine::DispatchEngine;
use crate::error::SynthesisError;
use crate::registry::{Location, LocationId, LocationRegistry};
use crate::route::{RouteDescriptor, TripDuration};
use crate::synthesis::{FixedRouteSynthesizer, RouteMetrics, RouteSynthesizer};

pub const DALLAS_DC: LocationId = LocationId(1);
pub const HOUSTON_DC: LocationId = LocationId(2);
pub const AUSTIN_DC: LocationId = LocationId(3);
pub const FORT_WORTH_STORE: LocationId = LocationId(4);
pub const SAN_ANTONIO_STORE: LocationId = LocationId(5);

/// Metrics returned by [`fixed_synthesizer`].
pub fn fixed_metrics() -> RouteMetrics {
    RouteMetrics {
        distance_miles: 64.0,
        estimated_duration: TripDuration::new(2, 40),
        fuel_savings_percent: 8.7,
        co2_reduction_kg: 26.0,
    }
}

pub fn fixed_synthesizer() -> Arc<dyn RouteSynthesizer> {
    Arc::new(FixedRouteSynthesizer::new(fixed_metrics()))
}

/// Engine over the default catalog with fixed metrics and default playback.
pub fn test_engine() -> DispatchEngine {
    test_engine_with(fixed_synthesizer(), PlaybackConfig::default())
}

/// # Panics
///
/// Panics if `config` is invalid.
pub fn test_engine_with(
    synthesizer: Arc<dyn RouteSynthesizer>,
    config: PlaybackConfig,
) -> DispatchEngine {
    DispatchEngine::new(
        Arc::new(LocationRegistry::default_catalog()),
        synthesizer,
        config,
    )
    .expect("test playback config should be valid")
}

/// Synthesizer that always fails, for failure-injection tests.
#[derive(Debug, Default)]
pub struct FailingSynthesizer {
    calls: AtomicUsize,
}

impl FailingSynthesizer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteSynthesizer for FailingSynthesizer {
    fn synthesize(&self, _locations: &[Location]) -> Result<RouteDescriptor, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SynthesisError::Unavailable(
            "optimization service unreachable".into(),
        ))
    }
}
