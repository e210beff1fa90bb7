//! Diffract command-line interface.
//!
//! Run beam propagation jobs from TOML configuration files:
//! ```sh
//! diffract-cli run job.toml
//! diffract-cli run job.toml --method "TR Fresnel" -o results/
//! diffract-cli validate job.toml
//! diffract-cli methods
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use diffract_core::PropagationMethod;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "diffract-cli")]
#[command(about = "Diffract: scalar beam propagation (Fresnel, angular spectrum, Fraunhofer)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate a source field described by a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Propagation method (overrides config file setting).
        #[arg(short, long)]
        method: Option<String>,
    },
    /// Validate a configuration file without propagating.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List the supported propagation methods.
    Methods,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            method,
        } => {
            println!("Diffract Beam Propagator");
            println!("========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let method_override = method
                .as_deref()
                .map(str::parse::<PropagationMethod>)
                .transpose()?;

            let result = runner::run_propagation(&job, method_override)?;
            let summary = result.summary(&job);
            println!(
                "  Power: {:.6e} (input) -> {:.6e} (output)",
                summary.input_power, summary.output_power
            );

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_intensity {
                let csv_path = out_dir.join("intensity.csv");
                runner::write_intensity_csv(&result, &csv_path, &job)?;
            }

            if job.output.save_json {
                let json_path = out_dir.join("summary.json");
                runner::write_summary_json(&summary, &json_path)?;
            }

            println!("Propagation complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let params = runner::validate_job(&job)?;
            println!("Configuration is valid: {}", config.display());
            println!(
                "  {} on {}x{}, k={:.6e} rad/m",
                job.optics.method, job.grid.rows, job.grid.cols, params.wavenumber
            );
            Ok(())
        }
        Commands::Methods => {
            println!("Available propagation methods:");
            println!();
            for method in PropagationMethod::ALL {
                println!("  {}", method);
            }
            println!();
            println!("Names are case-insensitive; '-' and '_' are read as spaces.");
            Ok(())
        }
    }
}
