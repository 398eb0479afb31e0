//! Playback clock: advances a continuous cursor along a route's waypoints.
//!
//! Progress is derived from the number of elapsed ticks rather than
//! accumulated, so after `n` ticks the position index is exactly
//! `min(n * tick_increment, last_index)` and a replay reproduces every frame.

use std::time::Duration;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::route::{RouteDescriptor, Waypoint};

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
pub const DEFAULT_TICK_INCREMENT: f64 = 0.015;

/// Playback tuning.
///
/// - `tick_interval_ms`: wall time between ticks; controls animation smoothness.
/// - `tick_increment`: index units advanced per tick; controls playback speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct PlaybackConfig {
    pub tick_interval_ms: u64,
    pub tick_increment: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            tick_increment: DEFAULT_TICK_INCREMENT,
        }
    }
}

impl PlaybackConfig {
    pub fn with_tick_interval_ms(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    pub fn with_tick_increment(mut self, increment: f64) -> Self {
        self.tick_increment = increment;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if !self.tick_increment.is_finite() || self.tick_increment <= 0.0 {
            return Err(ConfigError::InvalidTickIncrement(self.tick_increment));
        }
        Ok(())
    }
}

/// Cursor into the waypoint sequence.
///
/// The integer part of `position_index` is the segment start; the fractional
/// part is how far along the segment the vehicle is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Resource)]
pub struct SimulationProgress {
    pub ticks: u64,
    pub position_index: f64,
}

impl SimulationProgress {
    pub fn is_saturated(&self, route: &RouteDescriptor) -> bool {
        self.position_index >= route.last_index() as f64
    }
}

/// Progress after one more tick. Saturates at the route's last index.
pub fn tick(
    progress: &SimulationProgress,
    route: &RouteDescriptor,
    config: &PlaybackConfig,
) -> SimulationProgress {
    let ticks = progress.ticks + 1;
    SimulationProgress {
        ticks,
        position_index: position_after(ticks, route, config),
    }
}

/// Position index after `ticks` ticks.
pub fn position_after(ticks: u64, route: &RouteDescriptor, config: &PlaybackConfig) -> f64 {
    let last = route.last_index() as f64;
    (ticks as f64 * config.tick_increment).min(last)
}

/// Number of ticks a run takes to reach the final waypoint.
pub fn ticks_to_complete(route: &RouteDescriptor, config: &PlaybackConfig) -> u64 {
    let last = route.last_index() as f64;
    let mut ticks = (last / config.tick_increment).ceil().max(0.0) as u64;
    // ceil() of a rounded quotient can land one off in either direction.
    while ticks > 0 && position_after(ticks - 1, route, config) >= last {
        ticks -= 1;
    }
    while position_after(ticks, route, config) < last {
        ticks += 1;
    }
    ticks
}

/// Interpolated vehicle position for `progress`.
///
/// Returns the final waypoint exactly once progress reaches the last index.
pub fn interpolate(progress: &SimulationProgress, route: &RouteDescriptor) -> Option<Waypoint> {
    let last = route.last_index();
    let position = progress.position_index.max(0.0);
    let index = position.floor() as usize;
    if index >= last {
        return route.waypoints.last().cloned();
    }

    let fraction = position - index as f64;
    let current = &route.waypoints[index];
    let next = &route.waypoints[index + 1];
    Some(Waypoint {
        latitude: current.latitude + (next.latitude - current.latitude) * fraction,
        longitude: current.longitude + (next.longitude - current.longitude) * fraction,
        name: current.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::TripDuration;

    fn route(points: &[(f64, f64, &str)]) -> RouteDescriptor {
        RouteDescriptor {
            waypoints: points
                .iter()
                .map(|&(latitude, longitude, name)| Waypoint {
                    latitude,
                    longitude,
                    name: name.to_string(),
                })
                .collect(),
            distance_miles: 50.0,
            estimated_duration: TripDuration::new(1, 0),
            fuel_savings_percent: 8.0,
            co2_reduction_kg: 20.0,
        }
    }

    #[test]
    fn tick_advances_by_increment() {
        let route = route(&[(0.0, 0.0, "a"), (1.0, 1.0, "b"), (2.0, 2.0, "c")]);
        let config = PlaybackConfig::default();
        let mut progress = SimulationProgress::default();
        for n in 1..=50u64 {
            progress = tick(&progress, &route, &config);
            assert_eq!(progress.ticks, n);
            assert_eq!(progress.position_index, n as f64 * config.tick_increment);
        }
    }

    #[test]
    fn tick_saturates_at_last_index() {
        let route = route(&[(0.0, 0.0, "a"), (1.0, 1.0, "b")]);
        let config = PlaybackConfig::default().with_tick_increment(0.4);
        let mut progress = SimulationProgress::default();
        for _ in 0..10 {
            progress = tick(&progress, &route, &config);
        }
        assert_eq!(progress.position_index, 1.0);
        assert!(progress.is_saturated(&route));
    }

    #[test]
    fn ticks_to_complete_matches_saturation() {
        let config = PlaybackConfig::default();
        let two = route(&[(0.0, 0.0, "a"), (1.0, 1.0, "b")]);
        let three = route(&[(0.0, 0.0, "a"), (1.0, 1.0, "b"), (2.0, 2.0, "c")]);
        for r in [&two, &three] {
            let n = ticks_to_complete(r, &config);
            assert!(position_after(n, r, &config) >= r.last_index() as f64);
            assert!(position_after(n - 1, r, &config) < r.last_index() as f64);
        }
        assert_eq!(ticks_to_complete(&two, &config), 67);
    }

    #[test]
    fn interpolates_within_segment() {
        let route = route(&[(10.0, -20.0, "start"), (20.0, -10.0, "end")]);
        let progress = SimulationProgress {
            ticks: 0,
            position_index: 0.25,
        };
        let point = interpolate(&progress, &route).unwrap();
        assert_eq!(point.latitude, 12.5);
        assert_eq!(point.longitude, -17.5);
        assert_eq!(point.name, "start");
    }

    #[test]
    fn uses_segment_start_name() {
        let route = route(&[(0.0, 0.0, "a"), (1.0, 1.0, "b"), (2.0, 2.0, "c")]);
        let progress = SimulationProgress {
            ticks: 0,
            position_index: 1.5,
        };
        assert_eq!(interpolate(&progress, &route).unwrap().name, "b");
    }

    #[test]
    fn saturated_progress_returns_last_waypoint_exactly() {
        let route = route(&[(32.7767, -96.797, "dallas"), (29.7604, -95.3698, "houston")]);
        for position_index in [1.0, 1.7, 5.0] {
            let progress = SimulationProgress {
                ticks: 0,
                position_index,
            };
            assert_eq!(interpolate(&progress, &route).unwrap(), route.waypoints[1]);
        }
    }

    #[test]
    fn config_validation() {
        assert!(PlaybackConfig::default().validate().is_ok());
        assert!(matches!(
            PlaybackConfig::default().with_tick_interval_ms(0).validate(),
            Err(ConfigError::ZeroTickInterval)
        ));
        assert!(matches!(
            PlaybackConfig::default().with_tick_increment(-0.1).validate(),
            Err(ConfigError::InvalidTickIncrement(_))
        ));
        assert!(PlaybackConfig::default()
            .with_tick_increment(f64::NAN)
            .validate()
            .is_err());
    }
}
