pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "storemap")]
#[command(about = "storemap - administration CLI for the Store Navigator backend")]
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
    #[command(about = "Schema migrations, demo data and connectivity")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "User accounts and sessions")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Inspect a store's sector hierarchy")]
    Layout {
        #[command(subcommand)]
        cmd: commands::layout::LayoutCommands,
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

    match cli.command {
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, output_format).await,
        Commands::Layout { cmd } => commands::layout::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_format_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["storemap", "layout", "tree", "3", "--json"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Layout {
                cmd: commands::layout::LayoutCommands::Tree { store_id: 3 }
            }
        ));
    }

    #[test]
    fn admin_create_defaults_to_admin_role() {
        let cli = Cli::try_parse_from(["storemap", "admin", "create", "alice", "--password", "secret99"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
        match cli.command {
            Commands::Admin {
                cmd: commands::admin::AdminCommands::Create { username, password, role },
            } => {
                assert_eq!(username, "alice");
                assert_eq!(password.as_deref(), Some("secret99"));
                assert_eq!(role, "admin");
            }
            _ => panic!("expected admin create"),
        }
    }

    #[test]
    fn rejects_non_numeric_store_id() {
        assert!(Cli::try_parse_from(["storemap", "layout", "audit", "main"]).is_err());
    }
}
