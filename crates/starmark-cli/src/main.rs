//! starmark CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "starmark", version, about = "Skill mastery rating engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and demo records
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Regenerate a user's skill-week mapping from their roadmap
    Map {
        /// User identifier (any stored variant, e.g. "+91 8864862270")
        #[arg(long)]
        user: String,

        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a weekly test submission and store the result
    Submit {
        /// User identifier
        #[arg(long)]
        user: String,

        /// Month number (1-based)
        #[arg(long)]
        month: u32,

        /// Week number within the month (1..=4)
        #[arg(long)]
        week: u32,

        /// JSON file holding the answer array (null = unanswered)
        #[arg(long)]
        answers: PathBuf,

        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compute star ratings for the user's resume skills
    Rate {
        /// User identifier
        #[arg(long)]
        user: String,

        /// Only show skills whose label contains this text
        #[arg(long)]
        skill: Option<String>,

        /// Data directory override
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check roadmap/test documents or a whole data directory
    Validate {
        /// Roadmap JSON document to check
        #[arg(long)]
        roadmap: Option<PathBuf>,

        /// Weekly test JSON document to check
        #[arg(long)]
        test: Option<PathBuf>,

        /// Audit every record under a data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout is for tables and command output.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "starmark=info,starmark_core=info,starmark_embed=info,starmark_store=info",
        )
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { dir } => commands::init::execute(dir).await,
        Commands::Map {
            user,
            data_dir,
            config,
        } => commands::map::execute(&user, data_dir, config.as_deref()).await,
        Commands::Submit {
            user,
            month,
            week,
            answers,
            data_dir,
            config,
        } => {
            commands::submit::execute(&user, month, week, &answers, data_dir, config.as_deref())
                .await
        }
        Commands::Rate {
            user,
            skill,
            data_dir,
            config,
        } => commands::rate::execute(&user, skill.as_deref(), data_dir, config.as_deref()).await,
        Commands::Validate {
            roadmap,
            test,
            data_dir,
        } => commands::validate::execute(roadmap, test, data_dir).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
