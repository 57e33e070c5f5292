//! `openpaw history` — Show recent conversation log rows.

use anyhow::Context;
use openpaw_config::AppConfig;
use openpaw_core::store::MessageStore;
use openpaw_store::SqliteStore;

pub async fn run(count: u32) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let store = SqliteStore::new(&format!("sqlite://{}", config.db_path().display()))
        .await
        .context("Failed to open database")?;

    let messages = store.recent_messages(count as usize).await?;
    if messages.is_empty() {
        println!("  (log is empty)");
        return Ok(());
    }

    for msg in messages {
        let marker = match &msg.tool_call_id {
            Some(id) => format!(" [{id}]"),
            None => String::new(),
        };
        println!(
            "  {} {:<6}{} {}",
            msg.timestamp.format("%Y-%m-%d %H:%M:%S"),
            msg.role.as_str(),
            marker,
            msg.content
        );
    }
    Ok(())
}
