pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "couture")]
#[command(about = "Couture Fusion CLI - operator tools for the Couture Fusion API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Issue an upload signature with the configured Cloudinary credentials")]
    Sign(commands::sign::SignArgs),

    #[command(about = "Mint a development subject token")]
    Token(commands::token::TokenArgs),

    #[command(about = "Administrator allow-list")]
    Admins {
        #[command(subcommand)]
        cmd: commands::admins::AdminsCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
    let config = crate::config::config();

    match cli.command {
        Commands::Sign(args) => commands::sign::handle(args, config, output_format),
        Commands::Token(args) => commands::token::handle(args, config, output_format),
        Commands::Admins { cmd } => commands::admins::handle(cmd, config, output_format).await,
    }
}
