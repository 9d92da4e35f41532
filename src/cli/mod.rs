pub mod commands;
pub mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "apc")]
#[command(about = "AP course catalog operator CLI - migrations, seeding and the authorized-user list")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Database URL override (defaults to DATABASE_URL)")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Load accounts, subjects, prerequisites and AP classes from a settings file")]
    Seed {
        #[arg(help = "Settings file (.json, .yaml or .yml)")]
        file: PathBuf,
        #[arg(long, help = "Run migrations before seeding")]
        migrate: bool,
    },

    #[command(about = "Add an email to the authorized-user list so it can sign up")]
    Authorize {
        #[arg(help = "Email address to authorize")]
        email: String,
        #[arg(long, default_value = "TEACHER", help = "Role granted at sign-up (TEACHER or ADMIN)")]
        role: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let pool = commands::connect(cli.database_url.as_deref())?;

    match cli.command {
        Commands::Migrate => commands::migrate::handle(&pool, output_format).await,
        Commands::Seed { file, migrate } => commands::seed::handle(&pool, &file, migrate, output_format).await,
        Commands::Authorize { email, role } => {
            commands::authorize::handle(&pool, &email, &role, output_format).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seed_command() {
        let cli = Cli::try_parse_from(["apc", "--json", "seed", "config/settings.development.json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Seed { file, migrate } => {
                assert_eq!(file, PathBuf::from("config/settings.development.json"));
                assert!(!migrate);
            }
            _ => panic!("expected seed command"),
        }
    }

    #[test]
    fn authorize_defaults_to_teacher() {
        let cli = Cli::try_parse_from(["apc", "authorize", "new@school.edu"]).unwrap();
        match cli.command {
            Commands::Authorize { email, role } => {
                assert_eq!(email, "new@school.edu");
                assert_eq!(role, "TEACHER");
            }
            _ => panic!("expected authorize command"),
        }
    }
}
