//! Route model: waypoint snapshots and the synthesized route descriptor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;
use crate::registry::Location;

/// Base URL for the third-party directions link.
pub const MAP_DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/";

/// A point on a route. Snapshot of a [`Location`] taken at synthesis time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl From<&Location> for Waypoint {
    fn from(location: &Location) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            name: location.name.clone(),
        }
    }
}

/// Drive time estimate, displayed as `"{h}h {m}m"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDuration {
    pub hours: u32,
    pub minutes: u32,
}

impl TripDuration {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self {
            hours: hours + minutes / 60,
            minutes: minutes % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for TripDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Synthesized route: ordered waypoints plus summary metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Always at least two entries.
    pub waypoints: Vec<Waypoint>,
    pub distance_miles: f64,
    pub estimated_duration: TripDuration,
    pub fuel_savings_percent: f64,
    pub co2_reduction_kg: f64,
}

/// Data for the "route ready" overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub stops: usize,
    pub distance_miles: f64,
}

impl RouteDescriptor {
    /// Snapshot `locations` into waypoints, preserving their order.
    pub fn waypoints_for(locations: &[Location]) -> Result<Vec<Waypoint>, SynthesisError> {
        if locations.len() < 2 {
            return Err(SynthesisError::InsufficientLocations {
                found: locations.len(),
            });
        }
        Ok(locations.iter().map(Waypoint::from).collect())
    }

    /// Index of the final waypoint; the saturation point of playback.
    pub fn last_index(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    pub fn origin(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn destination(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            stops: self.waypoints.len(),
            distance_miles: self.distance_miles,
        }
    }

    pub fn shareable_link(&self) -> String {
        shareable_link(self)
    }
}

/// Directions URL visiting the route's waypoints in order.
pub fn shareable_link(route: &RouteDescriptor) -> String {
    let path = route
        .waypoints
        .iter()
        .map(|w| format!("{},{}", w.latitude, w.longitude))
        .collect::<Vec<_>>()
        .join("/");
    format!("{MAP_DIRECTIONS_URL}{path}")
}
