//! Contagion Simulation
//!
//! Runs the epidemic over an evolving contact network for a fixed number of
//! ticks, either back to back on a virtual clock or paced in real time.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use contagion_core::config::{default_config_toml, DEFAULT_CONFIG_PATH};
use contagion_core::logging::init_logging;
use contagion_core::output::{write_snapshot, write_statistics};
use contagion_core::pacing::{run_paced, run_virtual, wall_clock_ms, StopReason};
use contagion_core::{SimRng, Simulation, SimulationParams};
use contagion_events::TickStatistics;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "contagion_sim")]
#[command(about = "Epidemic spread over an evolving hub-and-hubless contact network")]
struct Args {
    /// TOML parameter file (defaults are used when absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility (seeded from the OS when absent)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Pace ticks on the wall clock using the configured tick interval
    #[arg(long)]
    realtime: bool,

    /// Directory for final_graph.json and stats.json
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    /// Ticks between progress lines
    #[arg(long, default_value_t = 10)]
    report_every: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = init_logging() {
        eprintln!("Warning: {}", e);
    }

    let params = match load_params(args.config.as_deref()) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Contagion Simulation");
    println!("====================");
    match args.seed {
        Some(seed) => println!("Seed: {}", seed),
        None => println!("Seed: entropy"),
    }
    println!("Ticks: {}", args.ticks);
    println!(
        "Hubs: {} x {} nodes, {} hubless",
        params.hubs.num_hubs, params.hubs.nodes_per_hub, params.hubless.initial_count
    );
    println!();

    let interval_ms = params.run.tick_interval_ms;
    let start = if args.realtime { wall_clock_ms() } else { 0 };
    let rng = match args.seed {
        Some(seed) => SimRng::seeded(seed),
        None => SimRng::from_entropy(),
    };
    let mut sim = Simulation::with_rng(params, rng, start);
    println!(
        "Built network: {} nodes, {} edges",
        sim.state().store.node_count(),
        sim.state().store.edge_count()
    );

    let report_every = args.report_every.max(1);
    let report = |_: &Simulation, stats: &TickStatistics| {
        if stats.day % report_every == 0 {
            print_progress(stats);
        }
    };

    if args.realtime {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("Error: could not start runtime: {}", e);
                return ExitCode::FAILURE;
            }
        };
        let reason = runtime.block_on(run_paced(
            &mut sim,
            Duration::from_millis(interval_ms),
            args.ticks,
            wall_clock_ms,
            report,
        ));
        if reason == StopReason::Interrupted {
            println!("Interrupted after {} ticks", sim.day());
        }
    } else {
        run_virtual(&mut sim, interval_ms, args.ticks, report);
    }

    let stats = sim.statistics();
    println!();
    println!("Simulation complete");
    print_progress(&stats);
    println!("  Nodes: {}", sim.state().store.node_count());
    println!("  Edges: {}", sim.state().store.edge_count());
    if let Some(at) = sim.vaccination().fired_at() {
        println!("  Mass vaccination at t={}ms", at.saturating_sub(sim.clock().start));
    }

    if let Some(dir) = args.output.as_deref() {
        if let Err(e) = write_outputs(dir, &sim, &stats) {
            eprintln!("Error: could not write output: {}", e);
            return ExitCode::FAILURE;
        }
        println!("Wrote output to {}", dir.display());
    }

    ExitCode::SUCCESS
}

fn load_params(path: Option<&Path>) -> Result<SimulationParams, Box<dyn std::error::Error>> {
    let params = match path {
        Some(path) => SimulationParams::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            SimulationParams::from_file(DEFAULT_CONFIG_PATH)?
        }
        None => SimulationParams::default(),
    };
    params.validate()?;
    Ok(params)
}

fn write_outputs(
    dir: &Path,
    sim: &Simulation,
    stats: &TickStatistics,
) -> Result<(), contagion_core::output::OutputError> {
    write_snapshot(dir, &sim.snapshot())?;
    write_statistics(dir, stats)?;
    Ok(())
}

fn print_progress(stats: &TickStatistics) {
    println!(
        "Day {:>4}: healthy {:>5}  infected {:>5}  recovered {:>5}  vaccinated {:>5}  dead {:>5}",
        stats.day, stats.healthy, stats.infected, stats.recovered, stats.vaccinated, stats.dead
    );
}
