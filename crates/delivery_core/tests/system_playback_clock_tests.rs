mod support;

use delivery_core::clock::{interpolate, SimulationProgress};
use delivery_core::test_helpers::{AUSTIN_DC, DALLAS_DC, HOUSTON_DC};
use delivery_core::Role;
use support::engine::{dallas_houston_ready, TestEngineBuilder};

#[test]
fn position_index_is_min_of_ticks_times_increment() {
    for increment in [0.015, 0.1, 0.07, 0.33] {
        let mut engine = TestEngineBuilder::new().with_tick_increment(increment).build();
        engine.select(Role::Origin, DALLAS_DC).unwrap();
        engine.select(Role::Stop2, AUSTIN_DC).unwrap();
        engine.select(Role::Stop3, HOUSTON_DC).unwrap();
        engine.generate_route().unwrap();
        engine.start().unwrap();

        let last = 2.0_f64;
        let mut n = 0u64;
        while let Some(frame) = engine.advance() {
            n += 1;
            assert_eq!(frame.tick, n);
            assert_eq!(frame.position_index, (n as f64 * increment).min(last));
            if frame.completed {
                break;
            }
        }
        assert_eq!(engine.current_progress().position_index, last);
    }
}

#[test]
fn progress_is_monotonic() {
    let mut engine = dallas_houston_ready(TestEngineBuilder::new());
    engine.start().unwrap();
    let mut previous = 0.0;
    while let Some(frame) = engine.advance() {
        assert!(frame.position_index >= previous);
        previous = frame.position_index;
        if frame.completed {
            break;
        }
    }
}

#[test]
fn replay_reproduces_every_frame() {
    let mut engine = dallas_houston_ready(TestEngineBuilder::new());

    let record = |engine: &mut delivery_core::DispatchEngine| {
        engine.start().unwrap();
        let mut frames = Vec::new();
        while let Some(frame) = engine.advance() {
            let done = frame.completed;
            frames.push((frame.tick, frame.position));
            if done {
                break;
            }
        }
        frames
    };

    let first = record(&mut engine);
    let second = record(&mut engine);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn interpolation_at_last_index_is_exact() {
    let engine = dallas_houston_ready(TestEngineBuilder::new());
    let route = engine.current_route().unwrap();
    let progress = SimulationProgress {
        ticks: 0,
        position_index: route.last_index() as f64,
    };
    let point = interpolate(&progress, route).unwrap();
    assert_eq!(point.latitude, 29.7604);
    assert_eq!(point.longitude, -95.3698);
    assert_eq!(point.name, "Houston Distribution Center");
}

#[test]
fn mid_segment_position_lies_between_endpoints() {
    let mut engine = dallas_houston_ready(TestEngineBuilder::new().with_tick_increment(0.5));
    engine.start().unwrap();
    let frame = engine.advance().unwrap();
    assert_eq!(frame.position.name, "Dallas Distribution Center");
    assert_eq!(frame.position.latitude, 32.7767 + (29.7604 - 32.7767) * 0.5);
    assert_eq!(frame.position.longitude, -96.797 + (-95.3698 - -96.797) * 0.5);
}
