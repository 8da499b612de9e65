use cache_simulator::generator::{TrafficLogConfig, TrafficLogGenerator};
use cache_simulator::models::{CacheAlgorithm, SimulationConfig};
use cache_simulator::runner::SimulationRunner;
use cache_simulator::stats::SimulationStats;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Cache simulator CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay traffic logs against the selected caches
    Simulate {
        /// Directory containing `.csv` / `.log` traffic files
        #[arg(short, long, value_name = "DIR", default_value = "traffic_logs")]
        input_dir: PathBuf,

        /// Cache capacity (number of entries)
        #[arg(short, long, default_value = "10000")]
        capacity: usize,

        /// Share of the capacity used by the TinyLFU admission window
        #[arg(long, default_value = "0.01")]
        window_ratio: f64,

        /// Caches to simulate (tinylfu, concurrent, lru, moka)
        /// If not provided, all caches will be used
        #[arg(short, long, value_name = "ALGOS", num_args = 1.., value_delimiter = ',')]
        algorithms: Option<Vec<String>>,

        /// Export results to CSV file
        #[arg(long, value_name = "PATH")]
        output_csv: Option<PathBuf>,
    },

    /// Generate synthetic traffic logs
    Generate {
        /// Total number of requests
        #[arg(long, default_value = "1000000")]
        requests: u64,

        /// Number of unique objects
        #[arg(long, default_value = "10000")]
        objects: u32,

        /// Percentage of traffic going to the hot set (default: 80%)
        #[arg(long, default_value = "80")]
        hot_traffic: u8,

        /// Percentage of objects in the hot set (default: 20%)
        #[arg(long, default_value = "20")]
        hot_objects: u8,

        /// Insert a scan burst after every N regular requests (0 = no scans)
        #[arg(long, default_value = "0")]
        scan_every: u64,

        /// Number of one-off keys per scan burst
        #[arg(long, default_value = "0")]
        scan_length: u64,

        /// Minimum object size in KB
        #[arg(long, default_value = "1")]
        min_size: u64,

        /// Maximum object size in KB
        #[arg(long, default_value = "1024")]
        max_size: u64,

        /// Requests per second, used for timestamps
        #[arg(long, default_value = "100")]
        rps: u32,

        /// Number of files to split the log into
        #[arg(long, default_value = "1")]
        files: u32,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output directory
        #[arg(short, long, default_value = "traffic_logs")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Generate {
            requests,
            objects,
            hot_traffic,
            hot_objects,
            scan_every,
            scan_length,
            min_size,
            max_size,
            rps,
            files,
            seed,
            output_dir,
        } => {
            // Convert KB to bytes for sizes
            let config = TrafficLogConfig {
                requests,
                unique_objects: objects,
                hot_traffic_percent: hot_traffic,
                hot_objects_percent: hot_objects,
                scan_every,
                scan_length,
                min_size: min_size * 1024,
                max_size: max_size * 1024,
                rps,
                files,
                seed,
                output_dir,
            };
            let paths = TrafficLogGenerator::new(config).generate()?;
            for path in paths {
                println!("{}", path.display());
            }
            Ok(())
        }

        Commands::Simulate {
            input_dir,
            capacity,
            window_ratio,
            algorithms,
            output_csv,
        } => {
            let config = SimulationConfig {
                input_dir,
                capacity,
                window_ratio,
                algorithms: select_algorithms(algorithms.as_deref()),
            };
            run_simulation(config, output_csv)
        }
    }
}

/// Map CLI names to algorithms; unknown names are skipped
fn select_algorithms(names: Option<&[String]>) -> Vec<CacheAlgorithm> {
    let Some(names) = names.filter(|names| !names.is_empty()) else {
        return CacheAlgorithm::all();
    };

    let mut selected = Vec::new();
    for name in names {
        match CacheAlgorithm::parse(name) {
            Some(algorithm) if !selected.contains(&algorithm) => selected.push(algorithm),
            Some(_) => {}
            None => warn!(name = %name, "unknown algorithm, skipping"),
        }
    }
    if selected.is_empty() {
        warn!("no valid algorithms selected, using all available algorithms");
        return CacheAlgorithm::all();
    }
    selected
}

/// Run the simulation with the given configuration
fn run_simulation(
    config: SimulationConfig,
    output_csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        input_dir = %config.input_dir.display(),
        capacity = config.capacity,
        window_ratio = config.window_ratio,
        algorithms = ?config.algorithms,
        "starting simulation"
    );

    let result = SimulationRunner::new(config).run()?;
    println!("\nSimulation completed in {:.2?}", result.duration);

    let stats = SimulationStats::from_result(&result);
    stats.print_summary();

    if let Some(csv_path) = output_csv {
        stats.export_csv(&csv_path)?;
        println!("\nResults exported to: {}", csv_path.display());
    }

    Ok(())
}
