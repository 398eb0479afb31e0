use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the delivery route workspace",
    long_about = "A unified CLI for running the playback demo, examples, benchmarks,\n\
                  and CI checks in the delivery route workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the headless delivery demo (Dallas DC -> Houston DC by default)
    Demo {
        /// Synthesizer seed
        #[arg(long, env = "DELIVERY_SEED")]
        seed: Option<u64>,
        /// Skip the simulated synthesis latency
        #[arg(long)]
        fast: bool,
        /// Extra arguments passed to delivery_demo
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Run the synchronous route_playback example
    Playback,
    /// Run Criterion benchmarks
    Bench,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run the example and demo binary
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_demo(seed: Option<u64>, fast: bool, extra: &[String]) {
    let mut args: Vec<String> = ["run", "-p", "delivery_runtime", "--bin", "delivery_demo", "--"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if let Some(seed) = seed {
        args.push("--seed".into());
        args.push(seed.to_string());
    }
    if fast {
        args.push("--latency-ms".into());
        args.push("0".into());
    }
    args.extend(extra.iter().cloned());
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    run_cargo(&refs);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test delivery_core");
    run_cargo(&["test", "-p", "delivery_core"]);

    step("Test delivery_runtime");
    run_cargo(&["test", "-p", "delivery_runtime"]);
}

fn ci_examples() {
    step("Run route_playback");
    run_cargo(&[
        "run",
        "-p",
        "delivery_core",
        "--example",
        "route_playback",
        "--release",
    ]);

    step("Run delivery_demo (seeded, no latency)");
    run_demo(Some(42), true, &["--stop3".to_string(), "5".to_string()]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&["bench", "--package", "delivery_core", "--bench", "playback"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { seed, fast, args } => run_demo(seed, fast, &args),
        Commands::Playback => {
            run_cargo(&[
                "run",
                "-p",
                "delivery_core",
                "--example",
                "route_playback",
                "--release",
            ]);
        }
        Commands::Bench => {
            run_cargo(&["bench", "--package", "delivery_core", "--bench", "playback"]);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
