//! Dispatch engine: the selection/route/playback state machine.
//!
//! All state lives as resources in a bevy_ecs [`World`]; commands mutate
//! those resources directly and [`DispatchEngine::advance`] runs the playback
//! schedule for one tick.
//!
//! Transitions:
//!
//! - select/clear: route dropped (a running playback is stopped first), phase
//!   becomes Ready with >= 2 roles bound, Idle otherwise
//! - route installed: Ready
//! - start: Ready/Completed -> Running when a route exists; no-op while Running
//! - stop: Running -> Ready, progress discarded
//! - saturation: Running -> Completed, stats captured
//! - reset: anything -> Idle, everything cleared

use std::sync::Arc;

use bevy_ecs::prelude::{Schedule, World};

use crate::clock::{self, PlaybackConfig, SimulationProgress};
use crate::error::{ConfigError, EngineError, SynthesisError};
use crate::registry::{Location, LocationId, LocationRegistry, RegistryResource};
use crate::route::{RouteDescriptor, RouteSummary, Waypoint};
use crate::selection::{Role, Selection};
use crate::state::{
    ActiveRoute, ActiveRun, PlaybackFrame, RunId, SimulationPhase, SimulationStats, StartOutcome,
};
use crate::synthesis::{RouteSynthesizer, SynthesizerResource};
use crate::systems::playback_schedule;

/// Input for one synthesis call, tagged with the selection revision it was
/// taken from.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub revision: u64,
    pub locations: Vec<Location>,
}

pub struct DispatchEngine {
    world: World,
    schedule: Schedule,
    last_run: u64,
}

impl DispatchEngine {
    pub fn new(
        registry: Arc<LocationRegistry>,
        synthesizer: Arc<dyn RouteSynthesizer>,
        config: PlaybackConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = World::new();
        world.insert_resource(RegistryResource(registry));
        world.insert_resource(SynthesizerResource(synthesizer));
        world.insert_resource(config);
        world.insert_resource(Selection::default());
        world.insert_resource(ActiveRoute::default());
        world.insert_resource(SimulationProgress::default());
        world.insert_resource(SimulationPhase::default());
        world.insert_resource(SimulationStats::default());
        world.insert_resource(ActiveRun::default());

        Ok(Self {
            world,
            schedule: playback_schedule(),
            last_run: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &Arc<LocationRegistry> {
        &self.world.resource::<RegistryResource>().0
    }

    pub fn list_locations(&self) -> &[Location] {
        self.registry().locations()
    }

    pub fn current_selection(&self) -> &Selection {
        self.world.resource::<Selection>()
    }

    /// Bound locations in role order.
    pub fn selected_locations(&self) -> Vec<&Location> {
        self.current_selection().active_locations(self.registry())
    }

    pub fn current_route(&self) -> Option<&RouteDescriptor> {
        self.world.resource::<ActiveRoute>().0.as_ref()
    }

    pub fn current_simulation_state(&self) -> SimulationPhase {
        *self.world.resource::<SimulationPhase>()
    }

    pub fn current_stats(&self) -> &SimulationStats {
        self.world.resource::<SimulationStats>()
    }

    pub fn current_progress(&self) -> SimulationProgress {
        *self.world.resource::<SimulationProgress>()
    }

    /// Interpolated vehicle position on the installed route.
    pub fn current_position(&self) -> Option<Waypoint> {
        let route = self.current_route()?;
        clock::interpolate(&self.current_progress(), route)
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.world.resource::<ActiveRun>().0
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        *self.world.resource::<PlaybackConfig>()
    }

    pub fn route_summary(&self) -> Option<RouteSummary> {
        self.current_route().map(RouteDescriptor::summary)
    }

    pub fn shareable_link(&self) -> Option<String> {
        self.current_route().map(RouteDescriptor::shareable_link)
    }

    pub fn synthesizer(&self) -> Arc<dyn RouteSynthesizer> {
        Arc::clone(&self.world.resource::<SynthesizerResource>().0)
    }

    /// Frame for the current position of the active run.
    pub fn current_frame(&self) -> Option<PlaybackFrame> {
        let run = self.active_run()?;
        self.frame(run)
    }

    fn frame(&self, run: RunId) -> Option<PlaybackFrame> {
        let progress = self.current_progress();
        Some(PlaybackFrame {
            run,
            tick: progress.ticks,
            position_index: progress.position_index,
            position: self.current_position()?,
            completed: self.current_simulation_state() == SimulationPhase::Completed,
        })
    }

    // -----------------------------------------------------------------------
    // Selection commands
    // -----------------------------------------------------------------------

    pub fn select(&mut self, role: Role, id: LocationId) -> Result<(), EngineError> {
        let registry = Arc::clone(self.registry());
        if let Err(err) = self
            .world
            .resource_mut::<Selection>()
            .select(role, id, &registry)
        {
            tracing::warn!(%role, location = %id, error = %err, "selection rejected");
            return Err(err);
        }
        tracing::debug!(%role, location = %id, "role selected");
        self.invalidate_route();
        Ok(())
    }

    pub fn clear(&mut self, role: Role) {
        self.world.resource_mut::<Selection>().clear(role);
        tracing::debug!(%role, "role cleared");
        self.invalidate_route();
    }

    /// Drop the route after a selection change, stopping any run on it.
    fn invalidate_route(&mut self) {
        if self.stop_run() {
            tracing::info!("selection changed during playback; run stopped");
        }
        self.world.resource_mut::<ActiveRoute>().0 = None;
        *self.world.resource_mut::<SimulationProgress>() = SimulationProgress::default();
        let phase = if self.current_selection().len() >= 2 {
            SimulationPhase::Ready
        } else {
            SimulationPhase::Idle
        };
        self.set_phase(phase);
    }

    // -----------------------------------------------------------------------
    // Route commands
    // -----------------------------------------------------------------------

    /// Snapshot the selection for a synthesis call.
    ///
    /// Rejects with `InsufficientLocations` before any synthesizer is invoked.
    pub fn synthesis_request(&self) -> Result<SynthesisRequest, EngineError> {
        let selection = self.current_selection();
        let locations: Vec<Location> = selection
            .active_locations(self.registry())
            .into_iter()
            .cloned()
            .collect();
        if locations.len() < 2 {
            tracing::warn!(selected = locations.len(), "route generation rejected");
            return Err(EngineError::InsufficientLocations {
                selected: locations.len(),
            });
        }
        Ok(SynthesisRequest {
            revision: selection.revision(),
            locations,
        })
    }

    /// Install the outcome of a synthesis call made for selection `revision`.
    ///
    /// Failures and stale results leave the engine untouched.
    pub fn install_route(
        &mut self,
        revision: u64,
        outcome: Result<RouteDescriptor, SynthesisError>,
    ) -> Result<&RouteDescriptor, EngineError> {
        let current = self.current_selection().revision();
        if revision != current {
            tracing::warn!(requested = revision, current, "discarding stale route");
            return Err(EngineError::StaleSelection {
                requested: revision,
                current,
            });
        }

        let route = match outcome {
            Ok(route) if route.waypoints.len() >= 2 => route,
            Ok(route) => {
                let err = SynthesisError::InsufficientLocations {
                    found: route.waypoints.len(),
                };
                tracing::warn!(error = %err, "synthesizer returned a degenerate route");
                return Err(err.into());
            }
            Err(err) => {
                tracing::warn!(error = %err, "route synthesis failed");
                return Err(err.into());
            }
        };

        if self.stop_run() {
            tracing::info!("route replaced during playback; run stopped");
        }
        tracing::info!(
            stops = route.waypoints.len(),
            distance_miles = route.distance_miles,
            duration = %route.estimated_duration,
            "route installed"
        );
        *self.world.resource_mut::<SimulationProgress>() = SimulationProgress::default();
        self.set_phase(SimulationPhase::Ready);
        let slot = &mut self.world.resource_mut::<ActiveRoute>().into_inner().0;
        Ok(slot.insert(route))
    }

    /// Synthesize and install a route with the engine's own synthesizer.
    pub fn generate_route(&mut self) -> Result<&RouteDescriptor, EngineError> {
        let request = self.synthesis_request()?;
        let outcome = self.synthesizer().synthesize(&request.locations);
        self.install_route(request.revision, outcome)
    }

    // -----------------------------------------------------------------------
    // Playback commands
    // -----------------------------------------------------------------------

    pub fn start(&mut self) -> Result<StartOutcome, EngineError> {
        if let Some(run) = self.active_run() {
            return Ok(StartOutcome::AlreadyRunning(run));
        }
        if self.current_route().is_none() {
            tracing::warn!("start rejected: no route");
            return Err(EngineError::NoRoute);
        }

        self.last_run += 1;
        let run = RunId(self.last_run);
        *self.world.resource_mut::<SimulationProgress>() = SimulationProgress::default();
        self.world.resource_mut::<ActiveRun>().0 = Some(run);
        self.set_phase(SimulationPhase::Running);
        tracing::info!(%run, "delivery run started");
        Ok(StartOutcome::Started(run))
    }

    /// Cancel the active run. Returns false when nothing was running.
    pub fn stop(&mut self) -> bool {
        self.stop_run()
    }

    fn stop_run(&mut self) -> bool {
        let Some(run) = self.world.resource_mut::<ActiveRun>().0.take() else {
            return false;
        };
        *self.world.resource_mut::<SimulationProgress>() = SimulationProgress::default();
        self.set_phase(SimulationPhase::Ready);
        tracing::info!(%run, "delivery run stopped");
        true
    }

    pub fn reset(&mut self) {
        self.world.resource_mut::<Selection>().clear_all();
        self.world.resource_mut::<ActiveRoute>().0 = None;
        self.world.resource_mut::<ActiveRun>().0 = None;
        *self.world.resource_mut::<SimulationProgress>() = SimulationProgress::default();
        *self.world.resource_mut::<SimulationStats>() = SimulationStats::default();
        self.set_phase(SimulationPhase::Idle);
        tracing::debug!("engine reset");
    }

    /// Run one playback tick. Returns `None` when no run is active.
    pub fn advance(&mut self) -> Option<PlaybackFrame> {
        let run = self.active_run()?;
        self.schedule.run(&mut self.world);
        self.frame(run)
    }

    /// Tick on behalf of `run`; ignored unless `run` is the active run.
    pub fn advance_run(&mut self, run: RunId) -> Option<PlaybackFrame> {
        if self.active_run() != Some(run) {
            return None;
        }
        self.advance()
    }

    /// Tick until the active run completes or `max_ticks` is reached.
    /// Returns the number of ticks executed.
    pub fn run_until_complete(&mut self, max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while ticks < max_ticks {
            match self.advance() {
                Some(frame) => {
                    ticks += 1;
                    if frame.completed {
                        break;
                    }
                }
                None => break,
            }
        }
        ticks
    }

    fn set_phase(&mut self, phase: SimulationPhase) {
        let mut current = self.world.resource_mut::<SimulationPhase>();
        let previous = *current;
        if previous != phase {
            tracing::debug!(from = %previous, to = %phase, "phase transition");
            *current = phase;
        }
    }
}
