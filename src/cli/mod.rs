pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "ags")]
#[command(about = "ags - operator tooling for the property marketplace API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Access token operations using the configured secret")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Password hashing")]
    Password {
        #[command(subcommand)]
        cmd: commands::password::PasswordCommands,
    },

    #[command(about = "Populate the configured database with demo data")]
    Seed,

    #[command(about = "Talk to a running API server")]
    Remote {
        #[command(subcommand)]
        cmd: commands::remote::RemoteCommands,
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Password { cmd } => commands::password::handle(cmd, output_format).await,
        Commands::Seed => commands::seed::handle(output_format).await,
        Commands::Remote { cmd } => commands::remote::handle(cmd, output_format).await,
    }
}
