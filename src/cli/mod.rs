pub mod commands;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};

#[derive(Parser)]
#[command(name = "tuitionctl")]
#[command(about = "Tuition API operator CLI - migrations and account bootstrap")]
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

    #[command(about = "Create an account with a one-time temporary password")]
    CreateUser {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "super_admin, admin, teacher or student")]
        role: String,
    },

    #[command(about = "Issue a new temporary password and force a change at next login")]
    ResetPassword {
        #[arg(long, help = "Login email")]
        email: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
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

    /// Prints `value` as JSON, or the text rendering otherwise
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => println!("{}", text()),
        }
        Ok(())
    }
}

/// Connects with the same environment the server reads
pub(crate) async fn connect() -> anyhow::Result<DatabaseManager> {
    let config = AppConfig::from_env()?;
    if config.database.is_memory() {
        anyhow::bail!("DATABASE_URL points at the in-memory store; the CLI needs Postgres");
    }
    Ok(DatabaseManager::connect(&config.database).await?)
}

pub(crate) fn store(manager: &DatabaseManager) -> PgStore {
    PgStore::new(manager.pool().clone())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::CreateUser { name, email, role } => {
            commands::users::create(name, email, role, output_format).await
        }
        Commands::ResetPassword { email } => commands::users::reset_password(email, output_format).await,
    }
}
