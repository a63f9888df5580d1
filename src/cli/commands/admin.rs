use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::json;
use std::io::BufRead;

use crate::cli::utils::{auth_repository, connect, output_success};
use crate::cli::OutputFormat;
use crate::database::models::UserRole;
use crate::services::AuthService;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create a user account")]
    Create {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
        #[arg(long, default_value = "admin", help = "Role: admin or user")]
        role: String,
    },

    #[command(about = "Delete expired login sessions")]
    PurgeSessions,
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create { username, password, role } => {
            let role = UserRole::parse(&role).ok_or_else(|| anyhow!("Unknown role '{role}', expected admin or user"))?;
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };

            let (config, db) = connect().await?;
            let user = AuthService::new(auth_repository(&db), &config)
                .create_user(&username, &password, role)
                .await;
            db.close().await;
            let user = user?;

            output_success(
                &output_format,
                &format!("Created {} '{}' (id {})", user.role, user.username, user.id),
                Some(json!({ "user": user })),
            )
        }
        AdminCommands::PurgeSessions => {
            let (config, db) = connect().await?;
            let purged = AuthService::new(auth_repository(&db), &config)
                .purge_expired_sessions()
                .await;
            db.close().await;
            let purged = purged?;

            output_success(
                &output_format,
                &format!("Removed {purged} expired session(s)"),
                Some(json!({ "purged": purged })),
            )
        }
    }
}

/// First line of stdin, without the trailing newline
fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(anyhow!("Password must not be empty"));
    }
    Ok(password)
}
