//! The in-progress review the user is composing on a product screen.

use log::info;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::device_store::KeyValueStore;
use crate::identity::{Identity, ANONYMOUS_NAME};
use crate::review_model::{Review, ReviewDraft};
use crate::review_store::{now_millis, ReviewStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewForm {
    pub draft: ReviewDraft,
}

impl ReviewForm {
    pub fn new(identity: Option<&Identity>) -> Self {
        let mut form = Self::default();
        form.sync_identity(identity);
        form
    }

    /// Resets the reviewer name from the identity, or clears it on sign-out.
    pub fn sync_identity(&mut self, identity: Option<&Identity>) {
        self.draft.name = identity
            .map(|user| user.display_label().to_string())
            .unwrap_or_default();
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.draft.rating = rating;
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.draft.comment = comment.into();
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.draft.image = image;
    }

    pub fn submit<S: KeyValueStore>(
        &mut self,
        product_id: &str,
        store: &ReviewStore<S>,
        identity: Option<&Identity>,
    ) -> Result<Vec<Review>, AppResponse> {
        self.submit_at(product_id, store, identity, now_millis())
    }

    /// Validates and stores the draft. On success the form is cleared for
    /// the next review; on any error it is left as the user typed it.
    pub fn submit_at<S: KeyValueStore>(
        &mut self,
        product_id: &str,
        store: &ReviewStore<S>,
        identity: Option<&Identity>,
        now_ms: i64,
    ) -> Result<Vec<Review>, AppResponse> {
        if let Err(e) = self.draft.validate() {
            info!("Rejected review for product {product_id}: {e}");
            return Err(e);
        }

        let reviews = store.append_draft(product_id, self.draft.clone(), now_ms)?;

        *self = Self::default();
        self.draft.name = identity
            .map(Identity::display_label)
            .unwrap_or(ANONYMOUS_NAME)
            .to_string();

        Ok(reviews)
    }
}
