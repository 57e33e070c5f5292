//! `openpaw models` — List the Gemini models available with this key.

use anyhow::Context;
use openpaw_config::AppConfig;
use openpaw_core::model::ModelClient;
use openpaw_gemini::GeminiClient;

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let api_key = config.api_key.clone().unwrap_or_default();
    let client = GeminiClient::new(api_key, config.model.clone());

    let models = client.list_models().await?;
    if models.is_empty() {
        println!("  (no models listed; check your API key)");
        return Ok(());
    }

    for model in models {
        let marker = if model == config.model { " (configured)" } else { "" };
        println!("  {model}{marker}");
    }
    Ok(())
}
