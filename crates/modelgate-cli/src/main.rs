//! Modelgate CLI
//!
//! Usage:
//!   mg validate --schema models.yaml --input payload.json   Validate a payload
//!   mg validate --schema models.yaml --model User           Validate stdin against User
//!   mg validate ... --pretty                                Indented output
//!   mg schema --schema models.yaml --model User             Print JSON Schema
//!   mg inspect --schema models.yaml                         List fields of every model
//!
//! `--model` defaults to the last model declared in the document.
//! Exit codes: 0 accepted, 1 rejected, 2 usage or document error.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mg")]
#[command(about = "Validate payloads against declarative model schemas", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON payload against a model
    Validate {
        /// Schema document (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Model name (default: last model in the document)
        #[arg(short, long)]
        model: Option<String>,

        /// Payload file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Indent output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the JSON Schema of a model
    Schema {
        /// Schema document (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Model name (default: last model in the document)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the fields of one or every model
    Inspect {
        /// Schema document (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Only this model
        #[arg(short, long)]
        model: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli.command) {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Validate {
            schema,
            model,
            input,
            pretty,
        } => commands::validate(&schema, model.as_deref(), &input, pretty),
        Commands::Schema { schema, model } => {
            commands::json_schema(&schema, model.as_deref())?;
            Ok(0)
        }
        Commands::Inspect { schema, model } => {
            commands::inspect(&schema, model.as_deref())?;
            Ok(0)
        }
    }
}

/// Initialize logging with tracing-subscriber
fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized
}
