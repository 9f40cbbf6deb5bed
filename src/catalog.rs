//! Read-only lookups over an injected [`Catalog`].

use std::sync::Arc;

use log::debug;

use crate::app_response::AppResponse;
use crate::product_model::{Catalog, Product};

pub const RELATED_LIMIT: usize = 6;

#[derive(Debug, Clone)]
pub struct CatalogLookup {
    catalog: Arc<Catalog>,
    related_limit: usize,
}

impl CatalogLookup {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_related_limit(catalog, RELATED_LIMIT)
    }

    pub fn with_related_limit(catalog: Arc<Catalog>, related_limit: usize) -> Self {
        Self {
            catalog,
            related_limit,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Linear scan across categories in catalog order; first exact match wins.
    pub fn find_by_id(&self, id: i64) -> Result<&Product, AppResponse> {
        self.catalog
            .categories()
            .flat_map(|(_, products)| products.iter())
            .find(|p| p.id == id)
            .ok_or_else(|| {
                debug!("Catalog miss for product {id}");
                AppResponse::NotFound(format!("No product found with id: {id}"))
            })
    }

    /// Name of the first category containing `id`.
    pub fn category_of(&self, id: i64) -> Option<&str> {
        self.catalog
            .categories()
            .find(|(_, products)| products.iter().any(|p| p.id == id))
            .map(|(name, _)| name)
    }

    /// Same-category products excluding `product`, in catalog order, truncated
    /// to the related limit. Empty when `product` is not in the catalog.
    pub fn related_to(&self, product: &Product) -> Vec<&Product> {
        self.related_to_id(product.id)
    }

    pub fn related_to_id(&self, id: i64) -> Vec<&Product> {
        let Some(category) = self.category_of(id) else {
            return Vec::new();
        };

        self.catalog
            .category(category)
            .unwrap_or_default()
            .iter()
            .filter(|p| p.id != id)
            .take(self.related_limit)
            .collect()
    }
}
