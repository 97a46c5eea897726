use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::models::{Order, Product, Review, User};

use super::Collection;

/// A type stored as one entry of a collection.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn record_id(&self) -> String;

    /// Server-side defaults applied right before the record is appended.
    fn prepare_insert(&mut self, _existing: &[Self]) {}
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn prepare_insert(&mut self, _existing: &[Self]) {
        self.cart = Vec::new();
        self.wishlist = Vec::new();
        self.saved_cards = Vec::new();
    }
}

impl Record for Order {
    const COLLECTION: Collection = Collection::Orders;

    fn record_id(&self) -> String {
        self.id.clone()
    }

    /// Orders get a millisecond timestamp id, bumped past the newest existing
    /// id so two orders placed in the same millisecond stay distinct.
    fn prepare_insert(&mut self, existing: &[Self]) {
        let now = Utc::now().timestamp_millis();
        let last = existing
            .iter()
            .filter_map(|o| o.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        self.id = now.max(last + 1).to_string();
    }
}

impl Record for Review {
    const COLLECTION: Collection = Collection::Reviews;

    fn record_id(&self) -> String {
        self.id.clone()
    }
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;

    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn prepare_insert(&mut self, existing: &[Self]) {
        self.id = existing.iter().map(|p| p.id).max().unwrap_or(0) + 1;
    }
}
