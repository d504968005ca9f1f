// File: ticketbot-core/src/platforms/telegram/runtime.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use ticketbot_common::models::Incoming;
use crate::platforms::telegram::client::TelegramClient;
use crate::platforms::telegram::requests::updates::get_updates;
use crate::Error;

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-poll loop: fetches updates, advances the offset and forwards
/// normalized updates to `tx`. Exits once the receiver is dropped.
async fn poll_runner(client: Arc<TelegramClient>, tx: UnboundedSender<Incoming>) {
    info!("(PollRunner) Started. Waiting for updates.");
    let mut offset = 0_i64;

    loop {
        let updates = match get_updates(&client, offset, POLL_TIMEOUT_SECS).await {
            Ok(u) => u,
            Err(e) => {
                error!("(PollRunner) getUpdates failed: {e}");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let update_id = update.update_id;
            match update.into_incoming() {
                Some(incoming) => {
                    if tx.send(incoming).is_err() {
                        warn!("(PollRunner) Receiver dropped; stopping.");
                        return;
                    }
                }
                None => debug!("(PollRunner) Skipping unsupported update {update_id}"),
            }
        }
    }
}

pub struct TelegramPlatform {
    client: Arc<TelegramClient>,
    rx: Mutex<Option<UnboundedReceiver<Incoming>>>,
    poll_task: Option<JoinHandle<()>>,
}

impl TelegramPlatform {
    pub fn new(client: Arc<TelegramClient>) -> Self {
        Self {
            client,
            rx: Mutex::new(None),
            poll_task: None,
        }
    }

    pub fn client(&self) -> Arc<TelegramClient> {
        self.client.clone()
    }

    /// Creates the update channel and spawns the poll loop.
    pub async fn connect(&mut self) -> Result<(), Error> {
        if self.poll_task.is_some() {
            info!("(TelegramPlatform) Already connected => skipping");
            return Ok(());
        }

        let (tx, rx) = unbounded_channel::<Incoming>();
        {
            let mut guard = self.rx.lock().await;
            *guard = Some(rx);
        }

        let client = self.client.clone();
        self.poll_task = Some(tokio::spawn(async move {
            poll_runner(client, tx).await;
        }));
        info!("(TelegramPlatform) Connected.");
        Ok(())
    }

    pub async fn disconnect(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
            let _ = task.await;
        }
        let mut guard = self.rx.lock().await;
        *guard = None;
        info!("(TelegramPlatform) Disconnected.");
    }

    /// Next inbound update, or `None` when not connected or the loop ended.
    pub async fn next_update(&self) -> Option<Incoming> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(r) => r.recv().await,
            None => None,
        }
    }
}
