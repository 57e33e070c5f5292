//! `openpaw clear` — Wipe the conversation log.

use anyhow::Context;
use openpaw_config::AppConfig;
use openpaw_core::store::MessageStore;
use openpaw_store::SqliteStore;

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let store = SqliteStore::new(&format!("sqlite://{}", config.db_path().display()))
        .await
        .context("Failed to open database")?;

    store.clear_messages().await?;
    println!("  Conversation log cleared.");
    Ok(())
}
