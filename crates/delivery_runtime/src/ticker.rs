//! Cancellable playback ticker.
//!
//! One [`Ticker`] drives one run. It is a tokio interval task that advances
//! the engine on behalf of its [`RunId`] and publishes each frame. Dropping
//! the ticker aborts the task; the task also exits by itself once the engine
//! no longer considers its run active, so a late tick can never move a newer
//! run.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use delivery_core::{DispatchEngine, PlaybackFrame, RunId};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::lock;

pub type FrameSender = Arc<watch::Sender<Option<PlaybackFrame>>>;

#[derive(Debug)]
pub struct Ticker {
    run: RunId,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the interval task for `run`. Must be called within a tokio runtime.
    pub fn spawn(
        run: RunId,
        engine: Arc<Mutex<DispatchEngine>>,
        frames: FrameSender,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                // Publish under the engine lock so a concurrent stop can't be
                // followed by a frame from the run it cancelled.
                let completed = {
                    let mut engine = lock(&engine);
                    match engine.advance_run(run) {
                        Some(frame) => {
                            let completed = frame.completed;
                            frames.send_replace(Some(frame));
                            completed
                        }
                        None => {
                            tracing::debug!(%run, "run no longer active; ticker exiting");
                            break;
                        }
                    }
                };
                if completed {
                    tracing::debug!(%run, "ticker finished");
                    break;
                }
            }
        });
        Self { run, handle }
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
