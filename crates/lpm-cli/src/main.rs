//! LPM CLI: run, validate and generate lattice particle scenarios.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lpm")]
#[command(version, about = "LPM: nonlinear static lattice particle solver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario to equilibrium.
    Simulate {
        /// Path to scenario file (TOML).
        #[arg(short, long, default_value = "scenario.toml")]
        config: String,

        /// Directory for the final stiffness arrays.
        #[arg(long)]
        dump_matrix: Option<String>,

        /// JSON file for the final particle positions.
        #[arg(long)]
        positions: Option<String>,

        /// Print every Newton iteration.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a scenario or solver config file.
    Validate {
        /// Path to the file.
        path: String,
    },

    /// Print the built-in example scenario.
    Example,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            config,
            dump_matrix,
            positions,
            verbose,
        } => commands::simulate(&config, dump_matrix.as_deref(), positions.as_deref(), verbose),
        Commands::Validate { path } => commands::validate(&path),
        Commands::Example => commands::example(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
