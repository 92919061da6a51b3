//! adaptest CLI: terminal shell over the adaptive exam core.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "adaptest", version, about = "Adaptive CISSP practice exam")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an adaptive practice exam
    Exam(commands::exam::ExamArgs),

    /// Validate a question bank file or directory
    Validate {
        /// Path to a .json/.toml bank or a directory of banks
        #[arg(long)]
        bank: PathBuf,
    },

    /// List the exam domains and their topics
    Domains,

    /// Render a saved JSON session report to HTML
    Render {
        /// Session report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output HTML path (default: next to the report)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create a starter config and sample question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adaptest=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Exam(args) => commands::exam::execute(args).await,
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Domains => commands::domains::execute(),
        Commands::Render { report, output } => commands::render::execute(report, output),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
