//! camden: command-line front end for the rust_fleet dispatch framework.
//!
//! Three subcommands, normally run in this order:
//!
//! ```text
//! camden build-network --out camden.json
//! camden simulate-traffic 2.5 --network camden.json
//! camden compute-route 3 --network camden.json --report out/
//! ```
//!
//! A network path ending in `.json` is a node-link document; anything else
//! is a directory of `nodes.csv` / `edges.csv`.  Logging goes through
//! `env_logger` (`RUST_LOG=debug camden ...` for more detail).

mod network;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use fl_core::{DispatchConfig, PartitionStrategy, StartPolicy};
use fl_dispatch::{DispatchReport, Dispatcher, SkipReason};
use fl_io::{CsvReportWriter, CsvStore, JsonReportWriter, JsonStore, NetworkStore, ReportWriter};
use fl_network::{Network, Role};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "camden", about = "Build a delivery network, add traffic, and route a small fleet", version)]
struct Cli {
    /// JSON run configuration.  Missing fields take their defaults.
    #[arg(long, global = true, value_name = "path")]
    config: Option<PathBuf>,

    /// Override the configured RNG seed.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a street network, trim it to a service area, assign roles and capacities.
    BuildNetwork(BuildArgs),
    /// Redraw congestion on a saved network.
    SimulateTraffic(TrafficArgs),
    /// Partition urgent customers and route one vehicle per group.
    ComputeRoute(RouteArgs),
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Place name for log lines (and for the OSM source).
    #[arg(long, default_value = "Camden, London, UK")]
    pub place: String,

    /// OSM PBF extract to read instead of the synthetic grid.
    #[cfg(feature = "osm")]
    #[arg(long, value_name = "path")]
    pub osm: Option<PathBuf>,

    /// Synthetic grid rows.
    #[arg(long, default_value_t = 12)]
    pub rows: usize,

    /// Synthetic grid columns.
    #[arg(long, default_value_t = 12)]
    pub cols: usize,

    /// Size of the service area; at most twice this many locations are kept.
    #[arg(long, default_value_t = 30)]
    pub target_nodes: usize,

    /// Customer demand is drawn from 1..=max; 0 leaves every demand at 0.
    #[arg(long, default_value_t = 10)]
    pub max_demand: u32,

    /// Output: a `.json` file or a CSV directory.
    #[arg(long, short, value_name = "path")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
struct TrafficArgs {
    /// Congestion intensity: 1.0 free flow, 2.5 and above rush hour.
    intensity: f64,

    #[arg(long, short, value_name = "path")]
    network: PathBuf,

    /// Write the result here instead of overwriting the input.
    #[arg(long, value_name = "path")]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RouteArgs {
    /// Number of vehicles, and of demand groups.
    vehicle_count: usize,

    #[arg(long, short, value_name = "path")]
    network: PathBuf,

    /// Redraw traffic at this intensity before routing.  Without it the
    /// saved weights are used as they are.
    #[arg(long)]
    traffic: Option<f64>,

    /// Vehicle capacity.
    #[arg(long)]
    capacity: Option<f64>,

    #[arg(long, value_enum)]
    partition: Option<PartitionArg>,

    /// Start each vehicle at the hub nearest its customers.
    #[arg(long)]
    nearest_hub: bool,

    /// Directory for `routes.csv`, `vehicles.csv` and `skipped.csv`.
    #[arg(long, value_name = "dir")]
    report: Option<PathBuf>,

    /// File for the JSON report.
    #[arg(long, value_name = "path")]
    report_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PartitionArg {
    Kmeans,
    Sweep,
}

impl From<PartitionArg> for PartitionStrategy {
    fn from(p: PartitionArg) -> Self {
        match p {
            PartitionArg::Kmeans => PartitionStrategy::KMeans,
            PartitionArg::Sweep  => PartitionStrategy::Sweep,
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    match cli.command {
        Command::BuildNetwork(args) => build_network(&args, config),
        Command::SimulateTraffic(args) => simulate_traffic(&args, config),
        Command::ComputeRoute(args) => compute_route(&args, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<DispatchConfig> {
    let Some(path) = path else {
        return Ok(DispatchConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let config: DispatchConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn store_for(path: &Path) -> Box<dyn NetworkStore> {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        Box::new(JsonStore::new(path))
    } else {
        Box::new(CsvStore::new(path))
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn build_network(args: &BuildArgs, config: DispatchConfig) -> Result<()> {
    config.validate()?;
    let network = network::build(args, &config)?;
    store_for(&args.out)
        .save(&network)
        .with_context(|| format!("saving network to {}", args.out.display()))?;

    println!("Network built with {}.", network.stats());
    println!(
        "  warehouse: {}  hubs: {}  customers: {}  urgent (>= {}): {}",
        network.warehouse().map_or_else(|| "-".to_owned(), |id| id.to_string()),
        network.hubs().len(),
        network.ids_with_role(Role::Customer).len(),
        config.min_urgency,
        network.urgent_customers(config.min_urgency).len()
    );
    println!("Saved to {}", args.out.display());
    Ok(())
}

fn simulate_traffic(args: &TrafficArgs, mut config: DispatchConfig) -> Result<()> {
    let mut network = load_network(&args.network)?;

    config.traffic_intensity = Some(args.intensity);
    let dispatcher = Dispatcher::new(config)?;
    let revision = dispatcher.apply_traffic(&mut network)?;

    let out = args.out.as_deref().unwrap_or(&args.network);
    store_for(out)
        .save(&network)
        .with_context(|| format!("saving network to {}", out.display()))?;

    let (lo, hi) = network
        .segments()
        .map(|s| s.congestion_factor())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| (lo.min(f), hi.max(f)));
    if let Some(revision) = revision {
        println!("Traffic at intensity {} applied ({revision}).", args.intensity);
    }
    if network.edge_count() > 0 {
        println!("  congestion factors in [{lo:.3}, {hi:.3}] over {} segments", network.edge_count());
    }
    println!("Saved to {}", out.display());
    Ok(())
}

fn compute_route(args: &RouteArgs, mut config: DispatchConfig) -> Result<()> {
    let mut network = load_network(&args.network)?;

    config.vehicle_count = args.vehicle_count;
    config.traffic_intensity = args.traffic;
    if let Some(c) = args.capacity {
        config.vehicle_capacity = c;
    }
    if let Some(p) = args.partition {
        config.partition = p.into();
    }
    if args.nearest_hub {
        config.start = StartPolicy::NearestHub;
    }

    let report = Dispatcher::new(config)?.run(&mut network)?;
    print_report(&report);

    if let Some(dir) = &args.report {
        let mut w = CsvReportWriter::new(dir)?;
        w.write_report(&report)?;
        w.finish()?;
        println!("Report tables written to {}", dir.display());
    }
    if let Some(path) = &args.report_json {
        let mut w = JsonReportWriter::new(path)?;
        w.write_report(&report)?;
        w.finish()?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn load_network(path: &Path) -> Result<Network> {
    store_for(path)
        .load()
        .with_context(|| format!("loading network from {}", path.display()))
}

fn print_report(report: &DispatchReport) {
    println!("Routes computed against weights {}:", report.revision);
    println!("{:<8} {:>6} {:>15} {:>12}  Route", "Vehicle", "Stops", "Load/Capacity", "Travel time");
    println!("{}", "-".repeat(60));
    for v in &report.vehicles {
        let route: Vec<String> = v.route_history.iter().map(ToString::to_string).collect();
        println!(
            "{:<8} {:>6} {:>15} {:>12.2}  {}",
            v.vehicle.to_string(),
            v.route_history.len().saturating_sub(1),
            format!("{:.1}/{:.1}", v.carried_load, v.capacity),
            v.travel_time,
            route.join(" -> ")
        );
    }
    println!(
        "Total: {} stops served, load {:.1}, travel time {:.2}",
        report.served(),
        report.total_load(),
        report.total_travel_time()
    );

    for reason in [SkipReason::Unreachable, SkipReason::OverCapacity] {
        let stops: Vec<String> = report
            .skipped_for(reason)
            .map(|s| format!("{}@{}", s.location, s.vehicle))
            .collect();
        if !stops.is_empty() {
            println!("Skipped ({reason}): {}", stops.join(", "));
        }
    }
}
