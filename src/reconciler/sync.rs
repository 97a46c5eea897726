use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::models::{CartLine, WishlistLine};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Body of the profile update that carries the cart and wishlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub cart: Vec<CartLine>,
    pub wishlist: Vec<WishlistLine>,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cart sync request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cart sync rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait CartSync: Send + Sync {
    async fn push(&self, snapshot: &CartSnapshot) -> Result<(), SyncError>;
}

/// Pushes snapshots to `PUT {base_url}/api/auth/me` with the session token.
#[derive(Debug, Clone)]
pub struct HttpCartSync {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpCartSync {
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/auth/me", base_url.trim_end_matches('/')),
            token: token.into(),
        }
    }
}

#[async_trait]
impl CartSync for HttpCartSync {
    async fn push(&self, snapshot: &CartSnapshot) -> Result<(), SyncError> {
        let response = self
            .client
            .put(&self.endpoint)
            .bearer_auth(&self.token)
            .json(snapshot)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::Rejected(response.status().to_string()));
        }
        Ok(())
    }
}

/// Coalesces snapshots and pushes only the latest one once no new snapshot
/// arrived for the debounce delay.
///
/// Dropping the debouncer flushes a pending snapshot before the task ends.
#[derive(Debug)]
pub struct Debouncer {
    tx: mpsc::UnboundedSender<CartSnapshot>,
    handle: JoinHandle<()>,
}

impl Debouncer {
    pub fn spawn(sync: Arc<dyn CartSync>, delay: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<CartSnapshot>();
        let handle = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                let mut closed = false;
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(snapshot) => latest = snapshot,
                            None => {
                                closed = true;
                                break;
                            }
                        },
                        _ = tokio::time::sleep(delay) => break,
                    }
                }
                flush(sync.as_ref(), &latest).await;
                if closed {
                    break;
                }
            }
        });
        Self { tx, handle }
    }

    pub fn schedule(&self, snapshot: CartSnapshot) {
        if self.tx.send(snapshot).is_err() {
            tracing::warn!("cart sync task is gone, change not scheduled");
        }
    }

    /// Stops accepting snapshots and waits for the pending one to be pushed.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(err) = self.handle.await {
            tracing::warn!(error = %err, "cart sync task ended abnormally");
        }
    }
}

async fn flush(sync: &dyn CartSync, snapshot: &CartSnapshot) {
    match sync.push(snapshot).await {
        Ok(()) => tracing::debug!(
            lines = snapshot.cart.len(),
            wishlist = snapshot.wishlist.len(),
            "cart synced"
        ),
        // Local state stays authoritative; there is no retry.
        Err(err) => tracing::warn!(error = %err, "cart sync failed"),
    }
}
