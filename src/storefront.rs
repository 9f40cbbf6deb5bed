//! Everything a product screen and the header need, wired together once at
//! startup: the catalog, the review cache, the identity hub and the review
//! form whose reviewer name follows the identity.

use std::sync::{Arc, Mutex};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::badges::{fetch_order_badge, DocumentQuery, OrderBadge};
use crate::catalog::CatalogLookup;
use crate::config::StorefrontConfig;
use crate::device_store::KeyValueStore;
use crate::identity::{Identity, IdentityHub};
use crate::local_db_state::AppDbState;
use crate::product_model::{Catalog, Product};
use crate::review_form::ReviewForm;
use crate::review_model::{Review, ReviewDraft};
use crate::review_store::{now_millis, ReviewStore};

/// Everything the product screen renders for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    pub category: String,
    pub default_color: Option<String>,
    pub default_size: Option<String>,
    pub related: Vec<Product>,
    pub reviews: Vec<Review>,
    /// Present when reviews could not be read; `reviews` is then empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_alert: Option<AppResponse>,
}

pub struct Storefront<S: KeyValueStore> {
    config: StorefrontConfig,
    catalog: CatalogLookup,
    reviews: ReviewStore<S>,
    identity: IdentityHub,
    form: Arc<Mutex<ReviewForm>>,
}

impl Storefront<AppDbState> {
    /// Opens the LMDB device store named by the config.
    pub fn open(config: StorefrontConfig, catalog: Catalog) -> Result<Self, AppResponse> {
        config.validate()?;
        let store = AppDbState::init_with_map_size(config.db_name.clone(), config.map_size_bytes)?;
        Ok(Self::new(config, catalog, store))
    }

    pub fn close(&mut self) -> Result<(), AppResponse> {
        self.reviews.device_store_mut().close_database()
    }
}

impl<S: KeyValueStore> Storefront<S> {
    pub fn new(config: StorefrontConfig, catalog: Catalog, store: S) -> Self {
        let catalog = CatalogLookup::with_related_limit(Arc::new(catalog), config.related_limit);
        let reviews = ReviewStore::with_key(store, config.reviews_key.clone());
        let identity = IdentityHub::new();
        let form = Arc::new(Mutex::new(ReviewForm::default()));

        let bound = Arc::clone(&form);
        identity.subscribe(move |user| {
            if let Ok(mut form) = bound.lock() {
                form.sync_identity(user);
            }
        });

        info!(
            "Storefront ready: {} products, reviews under '{}'",
            catalog.catalog().product_count(),
            reviews.key()
        );

        Self {
            config,
            catalog,
            reviews,
            identity,
            form,
        }
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogLookup {
        &self.catalog
    }

    pub fn review_store(&self) -> &ReviewStore<S> {
        &self.reviews
    }

    pub fn identity(&self) -> &IdentityHub {
        &self.identity
    }

    pub fn find_product(&self, id: i64) -> Result<&Product, AppResponse> {
        self.catalog.find_by_id(id)
    }

    pub fn related_products(&self, id: i64) -> Vec<&Product> {
        self.catalog.related_to_id(id)
    }

    pub fn load_reviews(&self, product_id: &str) -> Result<Vec<Review>, AppResponse> {
        self.reviews.load_for_product(product_id)
    }

    /// Resolves the product and gathers what its screen shows. A failed
    /// review read is reported in `reviews_alert` instead of failing the screen.
    pub fn open_product(&self, id: i64) -> Result<ProductDetail, AppResponse> {
        let product = self.catalog.find_by_id(id)?;
        let category = self.catalog.category_of(id).unwrap_or_default().to_string();

        let (reviews, reviews_alert) = match self.reviews.load_for_product(&id.to_string()) {
            Ok(reviews) => (reviews, None),
            Err(e) => {
                warn!("Failed to load reviews for product {id}: {e}");
                let alert = if e.is_user_visible() {
                    e
                } else {
                    AppResponse::StorageFailure(e.to_string())
                };
                (Vec::new(), Some(alert))
            }
        };

        Ok(ProductDetail {
            product: product.clone(),
            category,
            default_color: product.default_color().map(str::to_string),
            default_size: product.default_size().map(str::to_string),
            related: self.catalog.related_to(product).into_iter().cloned().collect(),
            reviews,
            reviews_alert,
        })
    }

    pub fn review_form(&self) -> ReviewForm {
        self.form.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn reviewer_name(&self) -> String {
        self.review_form().draft.name
    }

    /// Submits `draft` through the shared review form. An empty name falls
    /// back to the identity-derived default. A rejected draft leaves the
    /// form as it was.
    pub fn submit_review(
        &self,
        product_id: &str,
        mut draft: ReviewDraft,
    ) -> Result<Vec<Review>, AppResponse> {
        let mut form = self
            .form
            .lock()
            .map_err(|_| AppResponse::StorageFailure("Review form lock poisoned".to_string()))?;

        if draft.name.trim().is_empty() {
            draft.name = form.draft.name.clone();
        }

        // The shared form only changes once the review is stored.
        let mut pending = ReviewForm { draft };
        let identity = self.identity.current();
        let reviews = pending.submit_at(product_id, &self.reviews, identity.as_ref(), now_millis())?;
        *form = pending;
        Ok(reviews)
    }

    pub fn set_identity(&self, identity: Option<Identity>) {
        self.identity.publish(identity);
    }

    pub fn sign_out(&self) {
        self.identity.sign_out();
    }

    pub fn order_badge(&self, query: &dyn DocumentQuery) -> OrderBadge {
        let identity = self.identity.current();
        fetch_order_badge(identity.as_ref(), query, &self.config)
    }
}
