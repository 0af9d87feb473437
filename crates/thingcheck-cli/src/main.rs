//! thingcheck CLI - verify device telemetry against Thing Models.

use clap::{Args, Parser, Subcommand};

mod commands;
mod input;
mod logging;
mod output;

use commands::{batch, ingest, inspect, token, verify};
use thingcheck_core::{ActionOutputParams, UnknownFieldPolicy};
use thingcheck_schema::ParamCategory;

#[derive(Parser)]
#[command(name = "thingcheck")]
#[command(about = "Thing Model telemetry verification CLI")]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Validator options shared by the verifying commands.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// JSON file with validator options
    #[arg(long)]
    options: Option<String>,
    /// Handling of undeclared property fields: drop|warn
    #[arg(long)]
    unknown_fields: Option<UnknownFieldPolicy>,
    /// List driving action-output verification: input|output
    #[arg(long)]
    action_output_params: Option<ActionOutputParams>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a thing request's params
    Verify {
        /// Path to the Thing Model JSON
        model: String,
        /// Category: property|event|action-input|action-output
        category: ParamCategory,
        /// Request JSON file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Verify a request's buffered property and event snapshots
    Batch {
        /// Path to the Thing Model JSON
        model: String,
        /// Request JSON file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Verify a device publish envelope, or echo a connection notice
    Ingest {
        /// Path to the Thing Model JSON
        model: String,
        /// Envelope JSON file (or stdin if not provided)
        input: Option<String>,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Show the definitions of a Thing Model
    Inspect {
        /// Path to the Thing Model JSON
        model: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate correlation tokens
    Token {
        /// Node identifier; only the low byte is used
        #[arg(long, default_value_t = 0)]
        node_id: i64,
        /// Number of tokens to generate
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let result = match cli.command {
        Commands::Verify {
            model,
            category,
            input,
            json,
            options,
        } => verify::run(model, category, input, json, options),
        Commands::Batch {
            model,
            input,
            json,
            options,
        } => batch::run(model, input, json, options),
        Commands::Ingest {
            model,
            input,
            options,
        } => ingest::run(model, input, options),
        Commands::Inspect { model, json } => inspect::run(model, json),
        Commands::Token { node_id, count } => token::run(node_id, count),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
