use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

/// Sayso language interpreter.
///
/// Sayso is a small, natural-language-styled scripting language. This CLI
/// runs Sayso scripts and provides an interactive REPL.
///
/// EXAMPLES:
///     sayso run main.say           Run a Sayso script
///     sayso run main.say --json    Output diagnostics as JSON
///     sayso repl                   Start an interactive session
///
/// ENVIRONMENT VARIABLES:
///     SAYSO_JSON    Set to '1' for JSON diagnostics by default
#[derive(Parser)]
#[command(name = "sayso")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Sayso source file
    ///
    /// Tokenizes, parses, and executes the script. Lexical and parse
    /// failures abort before execution; unhandled runtime failures abort
    /// the run. All are reported as diagnostics.
    #[command(visible_alias = "r")]
    Run {
        /// Path to the Sayso source file
        file: String,
        /// Output diagnostics in JSON format
        #[arg(long, env = "SAYSO_JSON")]
        json: bool,
    },

    /// Start an interactive REPL
    ///
    /// Evaluates one line at a time against a persistent environment and
    /// echoes non-empty results.
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, json } => commands::run(&file, json),
        Commands::Repl => commands::repl(),
    }
}
