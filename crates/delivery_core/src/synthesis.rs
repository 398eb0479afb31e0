//! Pluggable route synthesizers.
//!
//! A synthesizer turns an ordered list of locations into a
//! [`RouteDescriptor`]. Implementations must keep the input order: reordering
//! stops is a job for a future optimizer sitting behind the same trait.
//!
//! Two implementations ship, selectable via [`SynthesizerKind`]:
//!
//! - **`RandomRouteSynthesizer`**: placeholder metrics drawn from a seedable RNG.
//! - **`FixedRouteSynthesizer`**: constant metrics, for demos and tests.
//!
//! The engine stores the synthesizer as an `Arc<dyn RouteSynthesizer>` ECS
//! resource so async callers can run it without holding the engine.

use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;
use crate::registry::Location;
use crate::route::{RouteDescriptor, TripDuration};

/// Trait for route synthesis backends.
pub trait RouteSynthesizer: Send + Sync {
    /// Build a route visiting `locations` in the given order.
    fn synthesize(&self, locations: &[Location]) -> Result<RouteDescriptor, SynthesisError>;
}

/// ECS resource wrapping the active synthesizer.
#[derive(Clone, Resource)]
pub struct SynthesizerResource(pub Arc<dyn RouteSynthesizer>);

/// Summary metrics attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_miles: f64,
    pub estimated_duration: TripDuration,
    pub fuel_savings_percent: f64,
    pub co2_reduction_kg: f64,
}

impl RouteMetrics {
    fn into_route(self, locations: &[Location]) -> Result<RouteDescriptor, SynthesisError> {
        Ok(RouteDescriptor {
            waypoints: RouteDescriptor::waypoints_for(locations)?,
            distance_miles: self.distance_miles,
            estimated_duration: self.estimated_duration,
            fuel_savings_percent: self.fuel_savings_percent,
            co2_reduction_kg: self.co2_reduction_kg,
        })
    }
}

/// Which synthesizer to build.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum SynthesizerKind {
    /// Placeholder random metrics. `None` seeds from OS entropy.
    Random { seed: Option<u64> },
    /// Same metrics for every route.
    Fixed(RouteMetrics),
}

impl Default for SynthesizerKind {
    fn default() -> Self {
        Self::Random { seed: None }
    }
}

pub fn build_synthesizer(kind: &SynthesizerKind) -> Arc<dyn RouteSynthesizer> {
    match kind {
        SynthesizerKind::Random { seed: Some(seed) } => {
            Arc::new(RandomRouteSynthesizer::seeded(*seed))
        }
        SynthesizerKind::Random { seed: None } => Arc::new(RandomRouteSynthesizer::from_entropy()),
        SynthesizerKind::Fixed(metrics) => Arc::new(FixedRouteSynthesizer::new(*metrics)),
    }
}

// ---------------------------------------------------------------------------
// Random placeholder
// ---------------------------------------------------------------------------

/// Stand-in for a real optimizer: waypoints follow the selection, metrics are
/// bounded random draws.
///
/// - distance: 20-100 mi, whole miles
/// - duration: 1-3 h plus 0-59 min
/// - fuel savings: 5-13 %, one decimal
/// - CO2 reduction: 15-40 kg, whole kilograms
#[derive(Debug)]
pub struct RandomRouteSynthesizer {
    rng: Mutex<StdRng>,
}

impl RandomRouteSynthesizer {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn draw_metrics(rng: &mut StdRng) -> RouteMetrics {
        let distance_miles = rng.gen_range(20.0..=100.0_f64).round();
        let hours = rng.gen_range(1..=3);
        let minutes = rng.gen_range(0..60);
        let fuel_savings_percent = (rng.gen_range(5.0..=13.0_f64) * 10.0).round() / 10.0;
        let co2_reduction_kg = rng.gen_range(15.0..=40.0_f64).round();
        RouteMetrics {
            distance_miles,
            estimated_duration: TripDuration::new(hours, minutes),
            fuel_savings_percent,
            co2_reduction_kg,
        }
    }
}

impl RouteSynthesizer for RandomRouteSynthesizer {
    fn synthesize(&self, locations: &[Location]) -> Result<RouteDescriptor, SynthesisError> {
        // Validate before drawing so rejected calls don't advance the RNG.
        RouteDescriptor::waypoints_for(locations)?;
        let metrics = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| SynthesisError::Unavailable("random source poisoned".into()))?;
            Self::draw_metrics(&mut rng)
        };
        metrics.into_route(locations)
    }
}

// ---------------------------------------------------------------------------
// Fixed metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FixedRouteSynthesizer {
    metrics: RouteMetrics,
}

impl FixedRouteSynthesizer {
    pub fn new(metrics: RouteMetrics) -> Self {
        Self { metrics }
    }
}

impl RouteSynthesizer for FixedRouteSynthesizer {
    fn synthesize(&self, locations: &[Location]) -> Result<RouteDescriptor, SynthesisError> {
        self.metrics.into_route(locations)
    }
}
