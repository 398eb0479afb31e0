#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use delivery_core::clock::PlaybackConfig;
use delivery_core::synthesis::RouteSynthesizer;
use delivery_core::test_helpers::{fixed_synthesizer, test_engine_with, DALLAS_DC, HOUSTON_DC};
use delivery_core::Role;
use delivery_runtime::DispatchSession;

/// Simulated synthesis latency used by the session tests.
pub const LATENCY: Duration = Duration::from_millis(1500);

pub fn session_with(synthesizer: Arc<dyn RouteSynthesizer>, latency: Duration) -> DispatchSession {
    DispatchSession::from_engine(
        test_engine_with(synthesizer, PlaybackConfig::default()),
        latency,
    )
}

/// Session with fixed metrics, Dallas DC -> Houston DC selected, no route yet.
pub fn dallas_houston_session() -> DispatchSession {
    let session = session_with(fixed_synthesizer(), LATENCY);
    session.select(Role::Origin, DALLAS_DC).expect("select origin");
    session.select(Role::Stop2, HOUSTON_DC).expect("select stop 2");
    session
}

/// Same as [`dallas_houston_session`] with the route already generated.
pub async fn dallas_houston_ready() -> DispatchSession {
    let session = dallas_houston_session();
    session.generate_route().await.expect("route");
    session
}

/// Dallas DC -> Houston DC with a route, 10ms ticks and no synthesis latency,
/// for tests on the real clock.
pub async fn fast_ready_session() -> DispatchSession {
    let session = DispatchSession::from_engine(
        test_engine_with(
            fixed_synthesizer(),
            PlaybackConfig::default().with_tick_interval_ms(10),
        ),
        Duration::ZERO,
    );
    session.select(Role::Origin, DALLAS_DC).expect("select origin");
    session.select(Role::Stop2, HOUSTON_DC).expect("select stop 2");
    session.generate_route().await.expect("route");
    session
}
