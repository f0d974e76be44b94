use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod scenario;
mod view;

#[derive(Parser)]
#[command(name = "fieldstats-cmd")]
#[command(about = "Command-line utility for field statistics evaluation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a field stats request over the partitions of a scenario file
    Evaluate {
        /// Path to the JSON scenario (request and partition statistics)
        #[arg(short, long)]
        input: String,

        /// Override the request level (cluster or indices)
        #[arg(long)]
        level: Option<String>,

        /// Collect partitions sequentially instead of in parallel
        #[arg(long)]
        sequential: bool,

        /// Pretty-print the JSON response
        #[arg(long)]
        pretty: bool,
    },

    /// Write the partitions of a scenario file as binary payloads
    Encode {
        /// Path to the JSON scenario
        #[arg(short, long)]
        input: String,

        /// Directory receiving one `<index>-<shard>.bin` file per partition
        output_dir: String,
    },

    /// Decode a binary partition payload and print it as JSON
    Inspect {
        /// Path to the payload file
        payload_path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            input,
            level,
            sequential,
            pretty,
        } => commands::evaluate::run(input, level, sequential, pretty),
        Commands::Encode { input, output_dir } => commands::encode::run(input, output_dir),
        Commands::Inspect { payload_path } => commands::inspect::run(payload_path),
    }
}
