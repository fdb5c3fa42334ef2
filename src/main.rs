//! UPSBet prediction service CLI
//!
//! Runs the HTTP API and small maintenance commands around it.

use clap::{Parser, Subcommand};
use upsbet::{Config, Result};

#[derive(Parser)]
#[command(name = "upsbet")]
#[command(about = "Football match prediction API backed by pre-trained regression models", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show database row counts and artifact availability
    Status,
    /// Write a default config file and create the data directories
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "upsbet=debug" } else { "upsbet=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Serve { port } => commands::serve(config, port).await,
        Commands::Status => commands::status(&config),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use upsbet::data::Database;
    use upsbet::model::ModelSet;
    use upsbet::server::{self, AppContext};

    pub async fn serve(mut config: Config, port: Option<u16>) -> Result<()> {
        if let Some(port) = port {
            config.server.port = port;
        }
        let ctx = AppContext::new(config)?;
        server::run(ctx).await
    }

    pub fn status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let counts = db.table_counts()?;
        println!("Database: {}", config.data.database_path);
        println!("  result rows:       {}", counts.results);
        println!("  corner rows:       {}", counts.corners);
        println!("  head-to-head rows: {}", counts.head_to_head);

        let models = ModelSet::load(&config.models);
        let mark = |loaded: bool| if loaded { "loaded" } else { "missing" };
        println!("Artifacts:");
        println!("  goals model:    {} ({})", mark(models.goals.is_some()), config.models.goals_path);
        println!("  corners model:  {} ({})", mark(models.corners.is_some()), config.models.corners_path);
        println!(
            "  corners scaler: {} ({})",
            mark(models.corners_scaler.is_some()),
            config.models.corners_scaler_path
        );
        Ok(())
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("models")?;
        std::fs::create_dir_all("public")?;
        println!("Created data/, models/ and public/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Drop the trained artifacts into models/");
        println!("  3. Run 'upsbet serve' and POST to /api/predict");
        Ok(())
    }
}
