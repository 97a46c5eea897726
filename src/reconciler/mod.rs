//! Client-side cart and wishlist kept in step with the signed-in user's
//! server copy.
//!
//! The server copy wins when a session is loaded. After that every local
//! change is pushed back through a debounced [`CartSync`].

use std::{sync::Arc, time::Duration};

use crate::models::{User, WishlistLine};

pub mod cart;
pub mod sync;

pub use cart::{CartProduct, CartState};
pub use sync::{CartSnapshot, CartSync, DEFAULT_DEBOUNCE, Debouncer, HttpCartSync, SyncError};

pub struct Reconciler {
    state: CartState,
    authenticated: bool,
    skip_next_sync: bool,
    debouncer: Debouncer,
}

impl Reconciler {
    /// Must be called inside a tokio runtime; the debounce task is spawned here.
    pub fn new(sync: Arc<dyn CartSync>) -> Self {
        Self::with_delay(sync, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(sync: Arc<dyn CartSync>, delay: Duration) -> Self {
        Self {
            state: CartState::default(),
            authenticated: false,
            skip_next_sync: false,
            debouncer: Debouncer::spawn(sync, delay),
        }
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Replaces the local cart and wishlist with the user's server copy.
    ///
    /// Guest items are dropped. The replacement itself is not echoed back to
    /// the server.
    pub fn load_session(&mut self, user: &User) {
        self.authenticated = true;
        self.skip_next_sync = true;
        self.state.replace(user.cart.clone(), user.wishlist.clone());
        tracing::debug!(
            user_id = %user.id,
            lines = self.state.items.len(),
            wishlist = self.state.wishlist.len(),
            "cart loaded from server"
        );
        self.changed();
    }

    /// Back to guest mode. Local state is kept but no longer synced.
    pub fn end_session(&mut self) {
        self.authenticated = false;
        self.skip_next_sync = false;
    }

    pub fn add_item(&mut self, product: CartProduct, quantity: u32) {
        self.state.add_item(product, quantity);
        self.changed();
    }

    pub fn remove_item(&mut self, id: &str) {
        self.state.remove_item(id);
        self.changed();
    }

    pub fn delete_item(&mut self, id: &str) {
        self.state.delete_item(id);
        self.changed();
    }

    pub fn clear_cart(&mut self) {
        self.state.clear_cart();
        self.changed();
    }

    pub fn toggle_wishlist(&mut self, line: WishlistLine) -> bool {
        let listed = self.state.toggle_wishlist(line);
        self.changed();
        listed
    }

    fn changed(&mut self) {
        if !self.authenticated {
            return;
        }
        if self.skip_next_sync {
            self.skip_next_sync = false;
            return;
        }
        self.debouncer.schedule(CartSnapshot {
            cart: self.state.items.clone(),
            wishlist: self.state.wishlist.clone(),
        });
    }

    /// Flushes any pending change and stops the sync task.
    pub async fn shutdown(self) {
        self.debouncer.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::CartLine;

    #[derive(Default)]
    struct RecordingSync {
        pushed: Mutex<Vec<CartSnapshot>>,
    }

    impl RecordingSync {
        fn pushed(&self) -> Vec<CartSnapshot> {
            self.pushed.lock().map(|p| p.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl CartSync for RecordingSync {
        async fn push(&self, snapshot: &CartSnapshot) -> Result<(), SyncError> {
            if let Ok(mut pushed) = self.pushed.lock() {
                pushed.push(snapshot.clone());
            }
            Ok(())
        }
    }

    struct RejectingSync;

    #[async_trait]
    impl CartSync for RejectingSync {
        async fn push(&self, _snapshot: &CartSnapshot) -> Result<(), SyncError> {
            Err(SyncError::Rejected("500 Internal Server Error".into()))
        }
    }

    fn mug() -> CartProduct {
        CartProduct {
            id: "1".into(),
            name: "Mug".into(),
            price: 4.0,
            image: String::new(),
        }
    }

    fn user_with_cart() -> User {
        User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            cart: vec![CartLine::new("9", "Lamp", 20.0, "", 2)],
            ..Default::default()
        }
    }

    async fn settle(delay: Duration) {
        tokio::time::sleep(delay).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn guest_changes_never_sync() {
        let sync = Arc::new(RecordingSync::default());
        let mut reconciler = Reconciler::new(sync.clone());

        reconciler.add_item(mug(), 1);
        settle(Duration::from_secs(5)).await;

        assert!(sync.pushed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn session_load_replaces_cart_without_syncing() {
        let sync = Arc::new(RecordingSync::default());
        let mut reconciler = Reconciler::new(sync.clone());
        reconciler.add_item(mug(), 3);

        reconciler.load_session(&user_with_cart());
        settle(Duration::from_secs(5)).await;

        let state = reconciler.state();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].id, "9");
        assert_eq!(state.total_quantity, 2);
        assert_eq!(state.total_amount, 40.0);
        assert!(sync.pushed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_coalesce_into_one_push() {
        let sync = Arc::new(RecordingSync::default());
        let mut reconciler = Reconciler::new(sync.clone());
        reconciler.load_session(&user_with_cart());

        reconciler.add_item(mug(), 1);
        settle(Duration::from_millis(400)).await;
        reconciler.add_item(mug(), 1);
        settle(Duration::from_millis(400)).await;
        reconciler.delete_item("9");
        assert!(sync.pushed().is_empty());

        settle(Duration::from_millis(1100)).await;
        let pushed = sync.pushed();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].cart.len(), 1);
        assert_eq!(pushed[0].cart[0].quantity, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_pending_change() {
        let sync = Arc::new(RecordingSync::default());
        let mut reconciler = Reconciler::new(sync.clone());
        reconciler.load_session(&user_with_cart());
        reconciler.clear_cart();

        reconciler.shutdown().await;

        let pushed = sync.pushed();
        assert_eq!(pushed.len(), 1);
        assert!(pushed[0].cart.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_push_keeps_local_state() {
        let mut reconciler = Reconciler::new(Arc::new(RejectingSync));
        reconciler.load_session(&user_with_cart());
        reconciler.add_item(mug(), 1);

        settle(Duration::from_secs(2)).await;

        assert_eq!(reconciler.state().items.len(), 2);
        assert_eq!(reconciler.state().total_amount, 44.0);
    }

    #[tokio::test(start_paused = true)]
    async fn logging_out_stops_syncing() {
        let sync = Arc::new(RecordingSync::default());
        let mut reconciler = Reconciler::new(sync.clone());
        reconciler.load_session(&user_with_cart());
        reconciler.end_session();

        reconciler.add_item(mug(), 1);
        settle(Duration::from_secs(5)).await;

        assert!(!reconciler.is_authenticated());
        assert!(sync.pushed().is_empty());
    }
}
