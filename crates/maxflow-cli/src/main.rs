mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use maxflow_core::ai::HttpSearchClient;
use maxflow_core::channel::{ChatClient, MaxClient};
use maxflow_core::runtime::{BotContext, Dispatcher};
use maxflow_core::SearchBackend;
use maxflow_storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "maxflow", about = "Flow-driven MAX messenger bot")]
struct Cli {
    /// Path to the flow configuration file
    #[arg(long, default_value = "configs/flow.json")]
    config: PathBuf,

    /// Path to the embedded database
    #[arg(long, default_value = "maxflow.db")]
    db: PathBuf,

    /// MAX Bot API token
    #[arg(long, env = "MAX_BOT_TOKEN")]
    token: String,

    /// Base URL of the AI search service
    #[arg(long, env = "SEARCH_SERVICE_URL", default_value = "http://127.0.0.1:8100")]
    search_url: String,

    /// Run without the AI search service; free-text queries answer "not found"
    #[arg(long, env = "SEARCH_SERVICE_DISABLED", default_value_t = false)]
    search_disabled: bool,

    /// Long-poll hold time, seconds
    #[arg(long, default_value_t = 30)]
    poll_timeout: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = maxflow_core::load_bot_config(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let context = Arc::new(BotContext::from_config(config)?);

    let db_path = cli
        .db
        .to_str()
        .context("database path is not valid UTF-8")?;
    let storage = Arc::new(Storage::new(db_path)?);

    let client = Arc::new(MaxClient::new(&cli.token));
    let search: Arc<dyn SearchBackend> =
        Arc::new(HttpSearchClient::new(&cli.search_url).with_enabled(!cli.search_disabled));

    let chat: Arc<dyn ChatClient> = client.clone();
    let dispatcher = Dispatcher::new(context, storage, chat, search);

    runner::run_polling(client, dispatcher, cli.poll_timeout).await
}
