//! `openpaw chat` — Interactive or single-message chat mode.

use std::sync::Arc;

use anyhow::Context;
use openpaw_agent::{AgentEvent, AgentLoop};
use openpaw_config::AppConfig;
use openpaw_core::store::{MemoryStore, MessageStore};
use openpaw_core::tool::ToolRegistry;
use openpaw_gemini::GeminiClient;
use openpaw_store::SqliteStore;
use openpaw_tools::{FileReadTool, FileWriteTool, ShellTool, TimeTool, WebPageReaderTool};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub async fn run(message: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    export GEMINI_API_KEY='...'");
        eprintln!();
        eprintln!("  Or add `api_key` to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        anyhow::bail!("No API key found. See above for setup instructions.");
    }

    let (mut agent, memory) = build_agent(&config).await?;

    let (tx, mut rx) = mpsc::unbounded_channel::<AgentEvent>();

    if let Some(msg) = message {
        // Single message mode
        agent.run_turn(&msg, &tx).await?;
        drain_events(&mut rx);
        if agent.is_awaiting_approval() {
            println!("  (a tool call is awaiting approval; run `openpaw chat` to respond)");
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  OpenPaw — chat with a tool-using agent");
    println!("  Model:  {}", config.model);
    println!("  Tools:  get_current_time, read_file, write_file, shell, read_web_page");
    println!();
    println!("  Type your message and press Enter.");
    println!("  '/remember <text>' saves a long-term memory.");
    println!("  'exit' or Ctrl+C quits.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt(agent.is_awaiting_approval(), agent.pending_tool());
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt(agent.is_awaiting_approval(), agent.pending_tool());
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }
        if let Some(text) = input.strip_prefix("/remember ") {
            match &memory {
                Some(store) => {
                    store.save(text).await?;
                    println!("  (saved)");
                }
                None => println!("  (memory is disabled in config)"),
            }
            prompt(false, None);
            continue;
        }

        if let Err(e) = agent.run_turn(input, &tx).await {
            eprintln!("  [Error] {e}");
        }
        drain_events(&mut rx);
        println!();
        prompt(agent.is_awaiting_approval(), agent.pending_tool());
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

/// Wire up the store, model client, tool registry, and loop from config.
/// Also hands back the memory store (when enabled) so `/remember` shares
/// the same database pool as the loop.
async fn build_agent(
    config: &AppConfig,
) -> anyhow::Result<(AgentLoop, Option<Arc<dyn MemoryStore>>)> {
    std::fs::create_dir_all(AppConfig::config_dir()).context("Failed to create config dir")?;
    let workspace = config.workspace_dir();
    std::fs::create_dir_all(&workspace).context("Failed to create workspace dir")?;

    let store = Arc::new(
        SqliteStore::new(&format!("sqlite://{}", config.db_path().display()))
            .await
            .context("Failed to open database")?,
    );

    let api_key = config.api_key.clone().unwrap_or_default();
    let client = Arc::new(
        GeminiClient::new(api_key, config.model.clone()).with_guide_file(&AppConfig::guide_path()),
    );

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(TimeTool));
    registry.register(Arc::new(FileReadTool::new(&workspace)));
    registry.register(Arc::new(FileWriteTool::new(&workspace)));
    registry.register(Arc::new(ShellTool::new(
        config.tools.shell_allowlist.clone(),
        config.tools.shell_timeout_secs,
    )));
    registry.register(Arc::new(WebPageReaderTool::new()));

    let message_store: Arc<dyn MessageStore> = store.clone();
    let mut agent = AgentLoop::new(client, Arc::new(registry), message_store)
        .with_hitl(config.hitl.enabled)
        .with_max_turns(config.max_turns)
        .with_history_limit(config.history_limit as usize);

    let memory = if config.memory.enabled {
        let memory: Arc<dyn MemoryStore> = store;
        agent = agent
            .with_memory(memory.clone())
            .with_recall_limit(config.memory.recall_limit as usize);
        Some(memory)
    } else {
        None
    };

    Ok((agent, memory))
}

/// Print everything the turn produced. Sends are queued while the turn
/// runs, so by the time `run_turn` returns the channel holds the full
/// ordered sequence.
fn drain_events(rx: &mut mpsc::UnboundedReceiver<AgentEvent>) {
    while let Ok(event) = rx.try_recv() {
        println!("  {event}");
    }
}

fn prompt(awaiting: bool, pending: Option<&str>) {
    use std::io::Write;
    if awaiting {
        let tool = pending.unwrap_or("tool");
        print!("  Approve '{tool}'? (yes/no) > ");
    } else {
        print!("  You > ");
    }
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_agent_shares_one_store_with_remember() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.memory.enabled = true;
        config.memory.db_path = Some(dir.path().join("chat.db").display().to_string());
        config.tools.workspace_dir = Some(dir.path().join("ws").display().to_string());

        let (_agent, memory) = build_agent(&config).await.unwrap();
        let memory = memory.expect("memory enabled in config");

        // the handle /remember writes through is live against the same db
        memory.save("prefers short answers").await.unwrap();
        let found = memory.search("short answers", 5).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "prefers short answers");
    }

    #[tokio::test]
    async fn build_agent_without_memory_returns_no_handle() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.memory.enabled = false;
        config.memory.db_path = Some(dir.path().join("chat.db").display().to_string());
        config.tools.workspace_dir = Some(dir.path().join("ws").display().to_string());

        let (_agent, memory) = build_agent(&config).await.unwrap();
        assert!(memory.is_none());
    }
}
