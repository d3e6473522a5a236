//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Harishan P V")]
#[command(version)]
#[command(about = "Portfolio blog builder with a validated Markdown content pipeline", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new blog post
    New {
        /// Title of the new post
        title: String,
    },

    /// Build the content index and pages
    #[command(alias = "g")]
    Build {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Validate content without writing anything
    Check,

    /// Remove build outputs
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, tag, category, draft)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
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
        None => std::env::current_dir().context("Cannot read the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            folio::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { title } => {
            let site = folio::Site::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            site.new_post(&title)?;
        }

        Commands::Build { watch } => {
            let site = folio::Site::new(&base_dir)?;
            tracing::info!("Building...");

            site.build()?;
            println!("Built successfully!");

            if watch {
                folio::commands::build::watch(&site).await?;
            }
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = folio::Site::new(&base_dir)?;
            let port = port.unwrap_or(site.config.server.port);
            let ip = ip.unwrap_or_else(|| site.config.server.ip.clone());

            tracing::info!("Building...");
            let collection = site.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&site, collection, &ip, port, !r#static, open).await?;
        }

        Commands::Check => {
            let site = folio::Site::new(&base_dir)?;
            folio::commands::check::run(&site)?;
        }

        Commands::Clean => {
            let site = folio::Site::new(&base_dir)?;
            tracing::info!("Cleaning build outputs...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = folio::Site::new(&base_dir)?;
            folio::commands::list::run(&site, &r#type)?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
