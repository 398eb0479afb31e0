//! Dispatch session: the handle a presentation layer holds.
//!
//! Wraps a [`DispatchEngine`] in `Arc<Mutex<_>>` and adds the two timed
//! concerns the engine leaves out:
//!
//! - playback: `start` spawns a [`Ticker`] for the new run; every other
//!   command reconciles afterwards and drops a ticker whose run the engine no
//!   longer considers active.
//! - synthesis: `generate_route` runs the synthesizer in a spawned task after
//!   the configured latency. Only one request per selection revision may be
//!   in flight; a request for a newer revision aborts the older one.
//!
//! Dropping the session aborts its ticker and any pending synthesis.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use delivery_core::clock::SimulationProgress;
use delivery_core::synthesis::build_synthesizer;
use delivery_core::{
    ConfigError, DispatchEngine, EngineError, Location, LocationId, LocationRegistry,
    PlaybackFrame, Role, RouteDescriptor, RunId, Selection, SimulationPhase, SimulationStats,
    StartOutcome, SynthesisError,
};
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::lock;
use crate::ticker::{FrameSender, Ticker};

#[derive(Debug)]
struct PendingSynthesis {
    revision: u64,
    abort: AbortHandle,
}

type PendingSlot = Arc<Mutex<Option<PendingSynthesis>>>;

pub struct DispatchSession {
    engine: Arc<Mutex<DispatchEngine>>,
    frames: FrameSender,
    ticker: Mutex<Option<Ticker>>,
    pending: PendingSlot,
    synthesis_latency: Duration,
}

impl DispatchSession {
    pub fn new(
        registry: Arc<LocationRegistry>,
        config: SessionConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = DispatchEngine::new(
            registry,
            build_synthesizer(&config.synthesizer),
            config.playback,
        )?;
        Ok(Self::from_engine(engine, config.synthesis_latency()))
    }

    pub fn from_engine(engine: DispatchEngine, synthesis_latency: Duration) -> Self {
        let (frames, _) = watch::channel(None);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            frames: Arc::new(frames),
            ticker: Mutex::new(None),
            pending: Arc::new(Mutex::new(None)),
            synthesis_latency,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Run `f` against the engine while holding its lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&DispatchEngine) -> R) -> R {
        f(&*lock(&self.engine))
    }

    pub fn list_locations(&self) -> Vec<Location> {
        self.with_engine(|engine| engine.list_locations().to_vec())
    }

    pub fn current_selection(&self) -> Selection {
        self.with_engine(|engine| engine.current_selection().clone())
    }

    pub fn current_route(&self) -> Option<RouteDescriptor> {
        self.with_engine(|engine| engine.current_route().cloned())
    }

    pub fn current_simulation_state(&self) -> SimulationPhase {
        self.with_engine(DispatchEngine::current_simulation_state)
    }

    pub fn current_stats(&self) -> SimulationStats {
        self.with_engine(|engine| *engine.current_stats())
    }

    pub fn current_progress(&self) -> SimulationProgress {
        self.with_engine(DispatchEngine::current_progress)
    }

    pub fn shareable_link(&self) -> Option<String> {
        self.with_engine(DispatchEngine::shareable_link)
    }

    /// Position stream. Holds the latest frame; `None` when nothing is playing.
    pub fn subscribe(&self) -> watch::Receiver<Option<PlaybackFrame>> {
        self.frames.subscribe()
    }

    /// True while a synthesis request is outstanding.
    pub fn is_generating(&self) -> bool {
        lock(&self.pending).is_some()
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn select(&self, role: Role, id: LocationId) -> Result<(), SessionError> {
        let result = lock(&self.engine).select(role, id);
        self.reconcile();
        result.map_err(SessionError::from)
    }

    pub fn clear(&self, role: Role) {
        lock(&self.engine).clear(role);
        self.reconcile();
    }

    pub fn stop(&self) -> bool {
        let stopped = lock(&self.engine).stop();
        self.reconcile();
        stopped
    }

    pub fn reset(&self) {
        if let Some(pending) = lock(&self.pending).take() {
            pending.abort.abort();
        }
        lock(&self.engine).reset();
        self.reconcile();
        self.frames.send_replace(None);
    }

    /// Start playback and spawn its ticker. Must be called within a tokio
    /// runtime. Starting while running returns the active run unchanged.
    ///
    /// The ticker slot is locked before the engine and held until the new
    /// ticker is stored, so concurrent starts and stops cannot leave a run
    /// without its ticker.
    pub fn start(&self) -> Result<RunId, SessionError> {
        let mut slot = lock(&self.ticker);
        let mut engine = lock(&self.engine);
        let run = match engine.start()? {
            StartOutcome::AlreadyRunning(run) => return Ok(run),
            StartOutcome::Started(run) => run,
        };

        if let Some(previous) = slot.take() {
            tracing::debug!(run = %previous.run(), "ticker replaced");
        }
        self.frames.send_replace(engine.current_frame());
        *slot = Some(Ticker::spawn(
            run,
            Arc::clone(&self.engine),
            Arc::clone(&self.frames),
            engine.playback_config().tick_interval(),
        ));
        Ok(run)
    }

    /// Generate a route for the current selection.
    ///
    /// The request is keyed by the selection revision: a second call for the
    /// same revision fails with `SynthesisInFlight`, a call for a newer
    /// revision aborts the outstanding one (which then resolves to
    /// `Superseded`), and a call older than the outstanding one is itself
    /// `Superseded`. The result is installed only if the selection has not
    /// changed in the meantime.
    pub async fn generate_route(&self) -> Result<RouteDescriptor, SessionError> {
        let (request, synthesizer) = {
            let engine = lock(&self.engine);
            (engine.synthesis_request()?, engine.synthesizer())
        };
        let revision = request.revision;

        let task = {
            let mut pending = lock(&self.pending);
            admit(pending.as_ref(), revision)?;

            let engine = Arc::clone(&self.engine);
            let slot = Arc::clone(&self.pending);
            let latency = self.synthesis_latency;
            let task = tokio::spawn(async move {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                let outcome = synthesizer.synthesize(&request.locations);
                let installed = lock(&engine)
                    .install_route(revision, outcome)
                    .map(RouteDescriptor::clone);
                release_pending(&slot, revision);
                installed.map_err(SessionError::from)
            });
            *pending = Some(PendingSynthesis {
                revision,
                abort: task.abort_handle(),
            });
            task
        };

        let result = match task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(SessionError::Superseded),
            Err(err) => {
                release_pending(&self.pending, revision);
                tracing::warn!(error = %err, "route synthesis task panicked");
                Err(SessionError::Engine(EngineError::SynthesisFailure(
                    SynthesisError::Unavailable(err.to_string()),
                )))
            }
        };
        self.reconcile();
        result
    }

    /// Wait until the active run completes. Resolves with the final frame,
    /// or `None` if the run is stopped, superseded, or nothing is running.
    pub async fn wait_for_completion(&self) -> Option<PlaybackFrame> {
        let mut frames = self.frames.subscribe();
        let run = lock(&self.engine).active_run();
        loop {
            // Clone out so the watch lock is never held while taking the engine lock.
            let latest = frames.borrow_and_update().clone();
            match (run, latest) {
                (Some(run), Some(frame)) if frame.run == run && frame.completed => {
                    return Some(frame)
                }
                (None, Some(frame)) if frame.completed => return Some(frame),
                (None, _) => return None,
                (Some(run), _) => {
                    if lock(&self.engine).active_run() != Some(run) {
                        // The ticker may have published completion just now.
                        let latest = frames.borrow().clone();
                        return latest.filter(|frame| frame.run == run && frame.completed);
                    }
                }
            }
            if frames.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Drop the ticker if its run is no longer the engine's active run, and
    /// clear the published frame if that run was cut short.
    fn reconcile(&self) {
        // Same lock order as `start`: ticker slot, then engine.
        let cancelled = {
            let mut slot = lock(&self.ticker);
            let active = lock(&self.engine).active_run();
            let stale = matches!(slot.as_ref(), Some(ticker) if Some(ticker.run()) != active);
            if stale {
                slot.take()
            } else {
                None
            }
        };
        let Some(ticker) = cancelled else {
            return;
        };
        let run = ticker.run();
        let finished = ticker.is_finished();
        drop(ticker);
        self.frames.send_if_modified(|frame| match frame {
            Some(current) if current.run == run && !current.completed => {
                *frame = None;
                true
            }
            _ => false,
        });
        if !finished {
            tracing::debug!(%run, "ticker cancelled");
        }
    }
}

impl Drop for DispatchSession {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.pending).take() {
            pending.abort.abort();
        }
        if let Some(ticker) = lock(&self.ticker).take() {
            tracing::debug!(run = %ticker.run(), "session dropped; ticker cancelled");
        }
    }
}

/// Decide whether a request for selection `revision` may run while
/// `outstanding` is pending. An older outstanding request is aborted; a newer
/// one wins and the caller is the one superseded.
fn admit(outstanding: Option<&PendingSynthesis>, revision: u64) -> Result<(), SessionError> {
    let Some(outstanding) = outstanding else {
        return Ok(());
    };
    if outstanding.revision == revision {
        tracing::debug!(revision, "route generation already in flight");
        return Err(SessionError::SynthesisInFlight);
    }
    if outstanding.revision > revision {
        tracing::debug!(
            outstanding = outstanding.revision,
            revision,
            "route generation for an outdated selection dropped"
        );
        return Err(SessionError::Superseded);
    }
    tracing::debug!(
        stale = outstanding.revision,
        revision,
        "superseding route generation"
    );
    outstanding.abort.abort();
    Ok(())
}

fn release_pending(slot: &Mutex<Option<PendingSynthesis>>, revision: u64) {
    let mut pending = lock(slot);
    if pending.as_ref().is_some_and(|p| p.revision == revision) {
        *pending = None;
    }
}
