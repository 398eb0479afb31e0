//! Playback systems and the schedule that runs them once per tick.
//!
//! [`advance_progress_system`] moves the cursor; [`completion_system`] runs
//! right after it and performs the terminal Running -> Completed transition
//! once the cursor saturates. Both only run while the phase is Running.

use bevy_ecs::prelude::{Res, ResMut, Schedule};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{self, PlaybackConfig, SimulationProgress};
use crate::state::{ActiveRoute, ActiveRun, SimulationPhase, SimulationStats};

fn is_running(phase: Res<SimulationPhase>) -> bool {
    *phase == SimulationPhase::Running
}

pub fn advance_progress_system(
    config: Res<PlaybackConfig>,
    route: Res<ActiveRoute>,
    mut progress: ResMut<SimulationProgress>,
) {
    let Some(route) = route.0.as_ref() else {
        return;
    };
    *progress = clock::tick(&progress, route, &config);
}

pub fn completion_system(
    route: Res<ActiveRoute>,
    progress: Res<SimulationProgress>,
    mut phase: ResMut<SimulationPhase>,
    mut stats: ResMut<SimulationStats>,
    mut run: ResMut<ActiveRun>,
) {
    let Some(route) = route.0.as_ref() else {
        return;
    };
    if !progress.is_saturated(route) {
        return;
    }

    *stats = SimulationStats::from_route(route);
    *phase = SimulationPhase::Completed;
    if let Some(finished) = run.0.take() {
        tracing::info!(
            run = %finished,
            ticks = progress.ticks,
            distance_miles = stats.total_distance,
            "delivery run completed"
        );
    }
}

/// Builds the per-tick playback schedule.
pub fn playback_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            advance_progress_system.run_if(is_running),
            completion_system.run_if(is_running),
        )
            .chain(),
    );
    schedule
}
