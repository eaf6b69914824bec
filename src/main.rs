use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shift_planner::display::{print_ranked_summary, write_csv_reports};
use shift_planner::generator::{RosterGenerator, RosterGeneratorConfig};
use shift_planner::parser::load_events;
use shift_planner::{plan_schedules, SchedulerConfig};

#[derive(Parser)]
#[command(name = "shift-planner")]
#[command(about = "Assigns competition events to shifts with as few conflicts as possible")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a roster file (.json, .csv or .txt) and write CSV reports
    Solve {
        /// Roster file
        input: PathBuf,

        /// TOML file with scheduler settings
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Number of shifts
        #[arg(long)]
        shifts: Option<usize>,

        /// Number of schedules to keep
        #[arg(long)]
        results: Option<usize>,

        /// Folder for the CSV reports
        #[arg(long, short, default_value = "output")]
        output: PathBuf,

        /// File name prefix for the CSV reports
        #[arg(long, default_value = "schedule")]
        base_name: String,

        /// Stop after visiting this many search nodes
        #[arg(long)]
        node_limit: Option<u64>,
    },

    /// Run the HTTP API
    Serve {
        #[arg(long, short, default_value_t = 8080)]
        port: u16,

        /// TOML file with scheduler settings
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Write a random roster as JSON
    Generate {
        #[arg(long, default_value_t = 20)]
        events: usize,

        #[arg(long, default_value_t = 40)]
        students: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<SchedulerConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => SchedulerConfig::from_toml_file(path)?,
        None => SchedulerConfig::default(),
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Solve {
            input,
            config,
            shifts,
            results,
            output,
            base_name,
            node_limit,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(shifts) = shifts {
                config.num_shifts = shifts;
            }
            if let Some(results) = results {
                config.num_results = results;
            }
            if node_limit.is_some() {
                config.node_limit = node_limit;
            }

            println!("Loading events from {}...", input.display());
            let records = load_events(&input)?;
            println!("Loaded {} events", records.len());

            println!("\n=== Searching for schedules ({} shifts) ===", config.num_shifts);
            let plan = plan_schedules(records, &config)?;
            print_ranked_summary(&plan.results);
            println!("\n{}", plan.stats);

            let written = write_csv_reports(&plan.results, &base_name, &output)?;
            println!("Schedules saved to:");
            for path in &written {
                println!("  - {}", path.display());
            }
        }
        Commands::Serve { port, config } => {
            let config = load_config(config.as_ref())?;
            config.validate()?;
            println!("Access the API at http://localhost:{}/api/health", port);
            shift_planner::web::start_server(port, config).await?;
        }
        Commands::Generate {
            events,
            students,
            seed,
            output,
        } => {
            let generator_config = RosterGeneratorConfig {
                num_events: events,
                num_students: students,
                ..RosterGeneratorConfig::default()
            };
            let records = RosterGenerator::new(generator_config, seed).generate();
            let json = serde_json::to_string_pretty(&records)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    info!(path = %path.display(), events = records.len(), "Wrote generated roster");
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
