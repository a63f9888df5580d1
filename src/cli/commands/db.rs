use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect, output_success, store_repository};
use crate::cli::OutputFormat;
use crate::database::StoreRepository;
use crate::services::seed_demo_data;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply pending schema migrations")]
    Migrate,

    #[command(about = "Load the bundled demo store when no store exists yet")]
    Seed,

    #[command(about = "Check connectivity and count stores")]
    Check,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (_config, db) = connect().await?;

    let result = match cmd {
        DbCommands::Migrate => {
            db.migrate().await?;
            output_success(&output_format, "Migrations applied", None)
        }
        DbCommands::Seed => match seed_demo_data(store_repository(&db).as_ref()).await? {
            Some(summary) => output_success(
                &output_format,
                &format!(
                    "Seeded demo store {} ({} sectors, {} products)",
                    summary.store_id, summary.sectors, summary.products
                ),
                Some(json!({ "seeded": summary })),
            ),
            None => output_success(&output_format, "Stores already present; nothing seeded", None),
        },
        DbCommands::Check => {
            let repo = store_repository(&db);
            repo.ping().await?;
            let stores = repo.count_stores().await?;
            output_success(
                &output_format,
                &format!("Database connected, {stores} store(s)"),
                Some(json!({ "database_status": "connected", "stores_count": stores })),
            )
        }
    };

    db.close().await;
    result
}
