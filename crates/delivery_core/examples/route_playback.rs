//! Plan Dallas DC -> Austin DC -> San Antonio Store and play the route back.
//!
//! Run with: cargo run -p delivery_core --example route_playback

use std::sync::Arc;

use delivery_core::clock::PlaybackConfig;
use delivery_core::synthesis::{build_synthesizer, SynthesizerKind};
use delivery_core::{DispatchEngine, LocationId, LocationRegistry, Role};

fn main() {
    const SEED: u64 = 123;
    const MAX_TICKS: u64 = 10_000;

    let mut engine = DispatchEngine::new(
        Arc::new(LocationRegistry::default_catalog()),
        build_synthesizer(&SynthesizerKind::Random { seed: Some(SEED) }),
        PlaybackConfig::default().with_tick_increment(0.05),
    )
    .expect("default playback config is valid");

    engine.select(Role::Origin, LocationId(1)).expect("origin");
    engine.select(Role::Stop2, LocationId(3)).expect("stop 2");
    engine.select(Role::Stop3, LocationId(5)).expect("stop 3");

    let route = engine.generate_route().expect("route").clone();
    println!("--- Route ({} stops, seed {}) ---", route.waypoints.len(), SEED);
    for (i, waypoint) in route.waypoints.iter().enumerate() {
        println!("  {}. {} ({}, {})", i + 1, waypoint.name, waypoint.latitude, waypoint.longitude);
    }
    println!(
        "Distance: {} mi  Est. time: {}  Fuel saved: {}%  CO2 reduced: {}kg",
        route.distance_miles,
        route.estimated_duration,
        route.fuel_savings_percent,
        route.co2_reduction_kg
    );

    engine.start().expect("start");
    let mut ticks = 0;
    while let Some(frame) = engine.advance() {
        ticks += 1;
        if frame.tick % 10 == 0 || frame.completed {
            println!(
                "  tick {:>4}  index {:.2}  ({:.4}, {:.4})  leaving {}",
                frame.tick,
                frame.position_index,
                frame.position.latitude,
                frame.position.longitude,
                frame.position.name
            );
        }
        if frame.completed || ticks >= MAX_TICKS {
            break;
        }
    }

    let stats = engine.current_stats();
    println!("\nState: {}", engine.current_simulation_state());
    println!(
        "Completed: {} mi, {}% fuel saved, {}kg CO2 reduced, {}",
        stats.total_distance, stats.fuel_saved, stats.co2_reduced, stats.time_estimate
    );
    if let Some(link) = engine.shareable_link() {
        println!("Share: {link}");
    }
}
