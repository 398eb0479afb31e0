use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::route::{RouteDescriptor, TripDuration, Waypoint};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Resource)]
pub enum SimulationPhase {
    /// Fewer than two roles bound, no route.
    #[default]
    Idle,
    /// Enough roles bound; a route may or may not be installed yet.
    Ready,
    Running,
    /// Last run reached the final waypoint; stats are populated.
    Completed,
}

impl fmt::Display for SimulationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Identifier of one playback run. A new id is issued on every start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Resource)]
pub struct ActiveRoute(pub Option<RouteDescriptor>);

/// The run the playback schedule is currently advancing, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Resource)]
pub struct ActiveRun(pub Option<RunId>);

/// Metrics captured when a run completes. Zeroed until then and after reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Resource)]
pub struct SimulationStats {
    pub total_distance: f64,
    pub fuel_saved: f64,
    pub co2_reduced: f64,
    pub time_estimate: TripDuration,
}

impl SimulationStats {
    pub fn from_route(route: &RouteDescriptor) -> Self {
        Self {
            total_distance: route.distance_miles,
            fuel_saved: route.fuel_savings_percent,
            co2_reduced: route.co2_reduction_kg,
            time_estimate: route.estimated_duration,
        }
    }

    pub fn is_zeroed(&self) -> bool {
        *self == Self::default()
    }
}

/// One sample of the vehicle position stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackFrame {
    pub run: RunId,
    pub tick: u64,
    pub position_index: f64,
    pub position: Waypoint,
    pub completed: bool,
}

/// Result of a start command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(RunId),
    /// Start while running is a no-op.
    AlreadyRunning(RunId),
}

impl StartOutcome {
    pub fn run(self) -> RunId {
        match self {
            Self::Started(run) | Self::AlreadyRunning(run) => run,
        }
    }
}
