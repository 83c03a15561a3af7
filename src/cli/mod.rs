pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::config;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "juntas-admin")]
#[command(about = "Juntas admin - maintenance commands run against the registry database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Check a running server's /health endpoint")]
    Health {
        #[arg(long, help = "Server base URL (defaults to PUBLIC_BASE_URL)")]
        url: Option<String>,
    },

    #[command(about = "Certificate lookups")]
    Certificate {
        #[command(subcommand)]
        cmd: commands::certificate::CertificateCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Pool for one-shot commands; fails early when the database is unreachable
pub async fn connect() -> anyhow::Result<PgPool> {
    let config = config();
    config.validate().map_err(anyhow::Error::msg)?;
    let pool = DatabaseManager::connect(&config.database)?;
    DatabaseManager::health_check(&pool).await?;
    Ok(pool)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Health { url } => commands::health::handle(url, output_format).await,
        Commands::Certificate { cmd } => commands::certificate::handle(cmd, output_format).await,
    }
}
