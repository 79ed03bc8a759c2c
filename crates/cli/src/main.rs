mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dhlpaket")]
#[command(about = "Create and cancel DHL Paket shipment labels", long_about = None)]
struct Cli {
    /// Config file to use instead of the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List shipment request files below a directory
    Scan { dir: PathBuf },

    /// Check shipment request files without creating labels
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Create labels for shipment request files
    Create {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory the label PDFs are written to
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Cancel shipments by tracking number
    Cancel {
        #[arg(required = true)]
        tracking_numbers: Vec<String>,

        #[arg(short, long, default_value_t = 0)]
        store: u32,
    },

    /// Save the shipping account of a store to the config
    SetStore {
        store_id: u32,

        /// Ten digit customer number
        #[arg(long)]
        ekp: String,

        /// Participation number per procedure, e.g. 01=04
        #[arg(long = "participation", value_name = "PROCEDURE=NUMBER")]
        participations: Vec<String>,

        /// Product used for packages without a product code
        #[arg(long)]
        default_product: Option<String>,
    },
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<config::AppConfig> {
    match path {
        Some(path) => config::load_path(path),
        None => Ok(config::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "using default config");
            config::AppConfig::default()
        })),
    }
}

fn save_config(path: Option<&PathBuf>, cfg: &config::AppConfig) -> Result<()> {
    match path {
        Some(path) => config::store_path(path, cfg),
        None => config::store(cfg),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { dir } => {
            let files = commands::scan_folder(&dir)?;
            commands::print_json(&files)
        }
        Commands::Validate { files } => {
            let results = commands::validate_requests(&files)?;
            commands::print_json(&results)
        }
        Commands::Create { files, out } => {
            let cfg = load_config(cli.config.as_ref())?;
            let outcome = commands::create_labels(cfg, &files, out.as_deref()).await?;
            commands::print_json(&outcome)
        }
        Commands::Cancel {
            tracking_numbers,
            store,
        } => {
            let cfg = load_config(cli.config.as_ref())?;
            let outcome = commands::cancel_labels(cfg, store, tracking_numbers).await;
            commands::print_json(&outcome)
        }
        Commands::SetStore {
            store_id,
            ekp,
            participations,
            default_product,
        } => {
            // a broken config must not be replaced by defaults here
            let mut cfg = match cli.config.as_ref() {
                Some(path) => config::load_path(path)?,
                None => config::load()?,
            };
            let store =
                commands::set_store(&mut cfg, store_id, &ekp, &participations, default_product)?;
            save_config(cli.config.as_ref(), &cfg)?;
            tracing::info!(store_id, "store settings saved");
            commands::print_json(&store)
        }
    }
}
