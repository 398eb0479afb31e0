#![allow(dead_code)]

use std::sync::Arc;

use delivery_core::clock::PlaybackConfig;
use delivery_core::synthesis::{build_synthesizer, RouteSynthesizer, SynthesizerKind};
use delivery_core::test_helpers::{fixed_synthesizer, DALLAS_DC, HOUSTON_DC};
use delivery_core::{DispatchEngine, LocationRegistry, Role};

/// Builder configuration for reproducible test engines.
#[derive(Clone, Debug)]
pub struct TestEngineConfig {
    pub seed: Option<u64>,
    pub playback: PlaybackConfig,
}

impl Default for TestEngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            playback: PlaybackConfig::default(),
        }
    }
}

/// Helper that builds a [`DispatchEngine`] over the default catalog.
#[derive(Default)]
pub struct TestEngineBuilder {
    config: TestEngineConfig,
    synthesizer: Option<Arc<dyn RouteSynthesizer>>,
}

impl TestEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the seeded random synthesizer instead of fixed metrics.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_tick_increment(mut self, increment: f64) -> Self {
        self.config.playback = self.config.playback.with_tick_increment(increment);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn RouteSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn build(self) -> DispatchEngine {
        let synthesizer = match (self.synthesizer, self.config.seed) {
            (Some(synthesizer), _) => synthesizer,
            (None, Some(seed)) => build_synthesizer(&SynthesizerKind::Random { seed: Some(seed) }),
            (None, None) => fixed_synthesizer(),
        };
        DispatchEngine::new(
            Arc::new(LocationRegistry::default_catalog()),
            synthesizer,
            self.config.playback,
        )
        .expect("test engine config should be valid")
    }
}

/// Engine with Dallas DC -> Houston DC selected and a route installed.
pub fn dallas_houston_ready(builder: TestEngineBuilder) -> DispatchEngine {
    let mut engine = builder.build();
    engine.select(Role::Origin, DALLAS_DC).expect("select origin");
    engine.select(Role::Stop2, HOUSTON_DC).expect("select stop 2");
    engine.generate_route().expect("route");
    engine
}
