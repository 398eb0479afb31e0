//! Headless delivery run: select stops, generate a route, play it back.
//!
//! ```text
//! cargo run -p delivery_runtime --bin delivery_demo -- --origin 1 --stop2 2 --stop3 5 --seed 7
//! RUST_LOG=debug DELIVERY_LATENCY_MS=0 cargo run -p delivery_runtime --bin delivery_demo -- --json
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use delivery_core::clock::{PlaybackConfig, DEFAULT_TICK_INCREMENT, DEFAULT_TICK_INTERVAL_MS};
use delivery_core::{LocationId, LocationRegistry, Role, SimulationStats};
use delivery_runtime::config::DEFAULT_SYNTHESIS_LATENCY_MS;
use delivery_runtime::{DispatchSession, SessionConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "delivery_demo",
    about = "Plan a delivery route and animate the vehicle along it"
)]
struct Cli {
    /// Origin location id
    #[arg(long, default_value_t = 1)]
    origin: u32,
    /// Second stop location id
    #[arg(long, default_value_t = 2)]
    stop2: u32,
    /// Optional third stop location id
    #[arg(long)]
    stop3: Option<u32>,
    /// Seed for the route synthesizer (random when omitted)
    #[arg(long, env = "DELIVERY_SEED")]
    seed: Option<u64>,
    /// Milliseconds between playback ticks
    #[arg(long, env = "DELIVERY_TICK_INTERVAL_MS", default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    tick_interval_ms: u64,
    /// Waypoint-index advance per tick
    #[arg(long, env = "DELIVERY_TICK_INCREMENT", default_value_t = DEFAULT_TICK_INCREMENT)]
    tick_increment: f64,
    /// Simulated synthesis latency in milliseconds
    #[arg(long, env = "DELIVERY_LATENCY_MS", default_value_t = DEFAULT_SYNTHESIS_LATENCY_MS)]
    latency_ms: u64,
    /// JSON file with the location catalog (built-in Texas catalog when omitted)
    #[arg(long, env = "DELIVERY_REGISTRY")]
    registry: Option<PathBuf>,
    /// List the catalog and exit
    #[arg(long)]
    list: bool,
    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunReport {
    stops: Vec<String>,
    ticks: u64,
    stats: SimulationStats,
    link: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(path: Option<&PathBuf>) -> Result<LocationRegistry, Box<dyn Error>> {
    match path {
        Some(path) => Ok(LocationRegistry::load(path)?),
        None => Ok(LocationRegistry::default_catalog()),
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let registry = Arc::new(load_registry(cli.registry.as_ref())?);

    if cli.list {
        for location in registry.locations() {
            println!(
                "{:>4}  {:<32} {:<20} {:>9.4} {:>10.4}",
                location.id.0,
                location.name,
                location.category.label(),
                location.latitude,
                location.longitude
            );
        }
        return Ok(());
    }

    let mut config = SessionConfig::default()
        .with_playback(
            PlaybackConfig::default()
                .with_tick_interval_ms(cli.tick_interval_ms)
                .with_tick_increment(cli.tick_increment),
        )
        .with_synthesis_latency_ms(cli.latency_ms);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    let session = DispatchSession::new(registry, config)?;

    session.select(Role::Origin, LocationId(cli.origin))?;
    session.select(Role::Stop2, LocationId(cli.stop2))?;
    if let Some(stop3) = cli.stop3 {
        session.select(Role::Stop3, LocationId(stop3))?;
    }

    tracing::info!("optimizing route");
    let route = session.generate_route().await?;
    tracing::info!(
        distance_miles = route.distance_miles,
        duration = %route.estimated_duration,
        fuel_savings_percent = route.fuel_savings_percent,
        "route ready"
    );

    let run = session.start()?;
    let mut frames = session.subscribe();
    let watcher = tokio::spawn(async move {
        while frames.changed().await.is_ok() {
            let Some(frame) = frames.borrow_and_update().clone() else {
                continue;
            };
            tracing::debug!(
                run = %frame.run,
                tick = frame.tick,
                lat = frame.position.latitude,
                lng = frame.position.longitude,
                "vehicle moved"
            );
            if frame.completed {
                break;
            }
        }
    });

    let Some(last) = session.wait_for_completion().await else {
        watcher.abort();
        return Err(format!("{run} ended without completing").into());
    };
    watcher.abort();

    let report = RunReport {
        stops: route.waypoints.iter().map(|w| w.name.clone()).collect(),
        ticks: last.tick,
        stats: session.current_stats(),
        link: session.shareable_link(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Route:          {}", report.stops.join(" -> "));
        println!("Ticks:          {}", report.ticks);
        println!("Total distance: {} mi", report.stats.total_distance);
        println!("Fuel saved:     {}%", report.stats.fuel_saved);
        println!("CO2 reduced:    {} kg", report.stats.co2_reduced);
        println!("Time estimate:  {}", report.stats.time_estimate);
        if let Some(link) = &report.link {
            println!("Share:          {link}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "delivery run failed");
            ExitCode::FAILURE
        }
    }
}
