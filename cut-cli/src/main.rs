//! cut - C unit test generator for symbolic execution reports

#![warn(missing_docs)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod discovery;
mod logging;

use commands::{generate, translate};

#[derive(Parser)]
#[command(name = "cut")]
#[command(about = "Generate C unit tests from static analysis path reports", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (info, debug)
    #[arg(short, long, global = true)]
    verbose: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate test files for every source in a compilation database
    Generate {
        /// Compilation database (defaults to the configured path)
        #[arg(long)]
        compile_commands: Option<PathBuf>,

        /// Knowledge base dump (defaults to the configured path)
        #[arg(long)]
        knowledge: Option<PathBuf>,

        /// Print generated code instead of writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Translate one case file and print the test functions
    Translate {
        /// Case file produced by the analysis engine
        case_file: PathBuf,

        /// Function under test
        #[arg(short, long)]
        function: String,

        /// Knowledge base dump (defaults to the configured path)
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Write it to this file instead
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::load_config(cli.config)?;

    // Initialize logging
    logging::init(cli.verbose.as_deref().unwrap_or(&config.log.level));

    match cli.command {
        Commands::Generate {
            compile_commands,
            knowledge,
            dry_run,
        } => {
            let generate_config = generate::GenerateConfig {
                compile_commands: compile_commands
                    .unwrap_or_else(|| config.input.compile_commands.clone()),
                knowledge: knowledge.unwrap_or_else(|| config.input.knowledge.clone()),
                dry_run,
                codegen: config.codegen.options(),
            };
            generate::generate(generate_config)?;
        }

        Commands::Translate {
            case_file,
            function,
            knowledge,
        } => {
            let knowledge = knowledge.unwrap_or_else(|| config.input.knowledge.clone());
            translate::translate(&case_file, &function, &knowledge, config.codegen.options())?;
        }

        Commands::Config { output } => match output {
            Some(path) => config::save_config(&config, &path)?,
            None => print!("{}", toml::to_string_pretty(&config)?),
        },
    }

    Ok(())
}
