//! Per-product review cache persisted as one JSON blob under a single key.
//!
//! Every write is read-entire-blob, replace-one-entry, write-entire-blob. Writes
//! issued through one [`ReviewStore`] are serialized by an internal lock;
//! writers in other processes or on other devices are last-writer-wins.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::device_store::KeyValueStore;
use crate::review_model::{Review, ReviewBlob, ReviewDraft};

pub const DEFAULT_REVIEWS_KEY: &str = "productReviews";

pub struct ReviewStore<S: KeyValueStore> {
    store: S,
    key: String,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> ReviewStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_REVIEWS_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn device_store(&self) -> &S {
        &self.store
    }

    pub fn device_store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reads the whole blob. A missing or empty value is an empty mapping.
    pub fn load_all(&self) -> Result<ReviewBlob, AppResponse> {
        match self.store.get(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => {
                let blob: ReviewBlob = serde_json::from_str(&raw).map_err(|e| {
                    AppResponse::StorageFailure(format!("Review blob unreadable: {e}"))
                })?;
                debug!("Loaded review blob: {} products, {} bytes", blob.len(), raw.len());
                Ok(blob)
            }
            _ => Ok(ReviewBlob::new()),
        }
    }

    pub fn load_for_product(&self, product_id: &str) -> Result<Vec<Review>, AppResponse> {
        let mut blob = self.load_all()?;
        Ok(blob.remove(product_id).unwrap_or_default())
    }

    /// Appends `review` to the product's list and writes the blob back.
    /// Returns the product's full list as persisted.
    ///
    /// On error nothing should be treated as saved.
    pub fn append_for_product(
        &self,
        product_id: &str,
        review: Review,
    ) -> Result<Vec<Review>, AppResponse> {
        self.append_with(product_id, |_| review)
    }

    /// Validates `draft`, stamps it with an id from `now_ms` (see
    /// [`next_review_id`]) and appends it. Invalid drafts never touch the
    /// device store.
    pub fn append_draft(
        &self,
        product_id: &str,
        draft: ReviewDraft,
        now_ms: i64,
    ) -> Result<Vec<Review>, AppResponse> {
        draft.validate()?;
        self.append_with(product_id, |existing| {
            draft.into_review(next_review_id(existing, now_ms))
        })
    }

    fn append_with<F>(&self, product_id: &str, build: F) -> Result<Vec<Review>, AppResponse>
    where
        F: FnOnce(&[Review]) -> Review,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppResponse::StorageFailure("Review store lock poisoned".to_string()))?;

        let mut blob = self.load_all()?;
        let reviews = blob.entry(product_id.to_string()).or_default();
        let review = build(reviews.as_slice());
        reviews.push(review);
        let updated = reviews.clone();

        let raw = serde_json::to_string(&blob).map_err(|e| {
            AppResponse::StorageFailure(format!("Review blob could not be encoded: {e}"))
        })?;
        if let Err(e) = self.store.set(&self.key, &raw) {
            warn!("Failed to persist review for product {product_id}: {e}");
            return Err(e);
        }

        info!(
            "Stored review for product {} ({} total for product)",
            product_id,
            updated.len()
        );
        Ok(updated)
    }
}

/// Review id for a new submission: the current millisecond clock, bumped past
/// the newest existing id so ids stay strictly increasing per product.
pub fn next_review_id(existing: &[Review], now_ms: i64) -> i64 {
    match existing.iter().map(|r| r.id).max() {
        Some(last) if last >= now_ms => last.saturating_add(1),
        _ => now_ms,
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
