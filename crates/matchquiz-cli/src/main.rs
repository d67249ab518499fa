//! matchquiz CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "matchquiz", version, about = "Matching quiz engine and weighted scorer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a weighted score
    Score {
        /// Correctly matched prompts
        #[arg(long)]
        correct: u32,

        /// Prompts in the exercise
        #[arg(long)]
        total: u32,

        /// Seconds used
        #[arg(long)]
        time_taken: f64,

        /// Countdown length in seconds
        #[arg(long, default_value = "120")]
        time_limit: f64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Replay a timed input script against a matching session
    Simulate {
        /// Path to the .toml event script
        #[arg(long)]
        script: PathBuf,

        /// Content bank file (defaults to the configured or built-in bank)
        #[arg(long)]
        content: Option<PathBuf>,

        /// Shuffle seed (overrides the script's)
        #[arg(long)]
        seed: Option<u64>,

        /// Player email; when set, the result is delivered to the sinks
        #[arg(long)]
        email: Option<String>,

        /// Directory to write result JSON into
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Render the board as plain text instead of a table
        #[arg(long)]
        plain: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Rank saved results
    Leaderboard {
        /// Directory of result JSON files
        #[arg(long)]
        dir: PathBuf,

        /// Also write an HTML leaderboard here
        #[arg(long)]
        html: Option<PathBuf>,

        /// Page title
        #[arg(long, default_value = "Ads Memory")]
        title: String,
    },

    /// Validate content bank TOML files
    Validate {
        /// Path to a content bank file or directory
        #[arg(long)]
        content: PathBuf,
    },

    /// Create starter config and example content bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "matchquiz=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            correct,
            total,
            time_taken,
            time_limit,
            json,
        } => commands::score::execute(correct, total, time_taken, time_limit, json),
        Commands::Simulate {
            script,
            content,
            seed,
            email,
            results_dir,
            plain,
            json,
            config,
        } => {
            commands::simulate::execute(commands::simulate::SimulateArgs {
                script,
                content,
                seed,
                email,
                results_dir,
                plain,
                json,
                config,
            })
            .await
        }
        Commands::Leaderboard { dir, html, title } => {
            commands::leaderboard::execute(dir, html, title)
        }
        Commands::Validate { content } => commands::validate::execute(content),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
