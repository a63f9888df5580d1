use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgAuthRepository, PgStoreRepository};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print any serializable value as pretty JSON
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Connect with the environment's configuration (`.env` included)
pub async fn connect() -> anyhow::Result<(AppConfig, DatabaseManager)> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();
    let db = DatabaseManager::connect(&config.database).await?;
    Ok((config, db))
}

pub fn store_repository(db: &DatabaseManager) -> Arc<PgStoreRepository> {
    Arc::new(PgStoreRepository::new(db.pool().clone()))
}

pub fn auth_repository(db: &DatabaseManager) -> Arc<PgAuthRepository> {
    Arc::new(PgAuthRepository::new(db.pool().clone()))
}
