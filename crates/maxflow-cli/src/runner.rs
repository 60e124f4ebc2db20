//! Long-polling loop: fetch updates, normalize, dispatch, advance the
//! marker. Poll failures back off briefly instead of crashing the bot.

use anyhow::Result;
use maxflow_core::channel::{normalize_update, MaxClient};
use maxflow_core::runtime::Dispatcher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const POLL_LIMIT: u32 = 100;
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(1);

pub async fn run_polling(
    client: Arc<MaxClient>,
    dispatcher: Dispatcher,
    poll_timeout: u32,
) -> Result<()> {
    info!("starting long-polling loop");
    let mut marker: Option<i64> = None;

    loop {
        match client.get_updates(marker, POLL_LIMIT, poll_timeout).await {
            Ok(batch) => {
                for update in &batch.updates {
                    let Some(event) = normalize_update(update) else {
                        continue;
                    };
                    if let Err(e) = dispatcher.dispatch(event).await {
                        error!("failed to process update: {e:#}");
                    }
                }
                if batch.marker.is_some() {
                    marker = batch.marker;
                }
            }
            Err(e) => {
                error!("polling failed: {e:#}");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
            }
        }
    }
}
