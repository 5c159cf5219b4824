//! CLI entry point for hexo-pipeline

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hexo_pipeline::{commands, Pipeline};

#[derive(Parser)]
#[command(name = "hexo-pipeline")]
#[command(version)]
#[command(about = "Build, minify and deploy a Hexo site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Pipeline config file (defaults to pipeline.yml in the base directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run tasks and their dependencies
    #[command(alias = "r")]
    Run {
        /// Tasks to run
        #[arg(default_value = "default")]
        tasks: Vec<String>,

        /// Print the execution plan without running anything
        #[arg(long)]
        dry_run: bool,

        /// Re-run when sources change
        #[arg(short, long)]
        watch: bool,
    },

    /// List available tasks
    List,

    /// Delete the public folder
    Clean,

    /// Print post excerpts as the template helper sees them
    Excerpt {
        /// Markdown file (defaults to every post in source/_posts)
        path: Option<PathBuf>,

        /// Print one JSON object per post
        #[arg(long)]
        json: bool,
    },

    /// Write a default pipeline.yml
    Init,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "hexo_pipeline=debug,info"
    } else {
        "hexo_pipeline=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let open = || match &cli.config {
        Some(path) => Pipeline::with_config_file(&base_dir, path),
        None => Pipeline::new(&base_dir),
    };

    match cli.command {
        Commands::Run {
            tasks,
            dry_run,
            watch,
        } => {
            let pipeline = open()?;
            if watch && !dry_run {
                commands::run::watch(&pipeline, &tasks).await?;
            } else {
                commands::run::run(&pipeline, &tasks, dry_run).await?;
            }
        }

        Commands::List => {
            let pipeline = open()?;
            commands::list::run(&pipeline)?;
        }

        Commands::Clean => {
            let pipeline = open()?;
            tracing::info!("Cleaning public folder...");
            commands::clean::run(&pipeline)?;
        }

        Commands::Excerpt { path, json } => {
            let pipeline = open()?;
            commands::excerpt::run(&pipeline, path.as_deref(), json)?;
        }

        Commands::Init => {
            let path = commands::init::init_config(&base_dir)?;
            println!("Wrote {}", path.display());
        }

        Commands::Version => {
            println!("hexo-pipeline version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
