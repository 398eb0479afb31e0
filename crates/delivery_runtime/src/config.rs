use std::time::Duration;

use delivery_core::clock::PlaybackConfig;
use delivery_core::synthesis::SynthesizerKind;
use delivery_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Simulated round trip to the optimization service.
pub const DEFAULT_SYNTHESIS_LATENCY_MS: u64 = 1500;

/// Parameters for building a [`crate::DispatchSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub playback: PlaybackConfig,
    /// Delay before the synthesizer runs; 0 disables it.
    pub synthesis_latency_ms: u64,
    pub synthesizer: SynthesizerKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            synthesis_latency_ms: DEFAULT_SYNTHESIS_LATENCY_MS,
            synthesizer: SynthesizerKind::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.synthesizer = SynthesizerKind::Random { seed: Some(seed) };
        self
    }

    pub fn with_synthesizer(mut self, kind: SynthesizerKind) -> Self {
        self.synthesizer = kind;
        self
    }

    pub fn with_playback(mut self, playback: PlaybackConfig) -> Self {
        self.playback = playback;
        self
    }

    pub fn with_synthesis_latency_ms(mut self, latency_ms: u64) -> Self {
        self.synthesis_latency_ms = latency_ms;
        self
    }

    pub fn synthesis_latency(&self) -> Duration {
        Duration::from_millis(self.synthesis_latency_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.playback.validate()
    }
}
