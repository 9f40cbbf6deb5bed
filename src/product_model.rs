//! Static product data.
//!
//! The catalog is loaded once from JSON shaped as `{"<category>": [product, ...]}`
//! and is immutable afterwards. Category order is the order in which the
//! categories appear in the source document.

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::SerializeMap;

use crate::app_response::AppResponse;

/// A single catalog entry.
///
/// ```rust
/// use storefront_core::product_model::Product;
///
/// let product: Product = serde_json::from_str(
///     r#"{"id":10,"name":"Mug","description":"Stoneware","price":12.5,
///         "img":"mug.png","colors":["white","black"]}"#,
/// )?;
/// assert!(product.sizes.is_none());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique across the whole catalog, not only within a category.
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub img: String,
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
}

impl Product {
    pub fn default_color(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }

    pub fn default_size(&self) -> Option<&str> {
        self.sizes.as_ref().and_then(|s| s.first()).map(String::as_str)
    }

    fn validate(&self) -> Result<(), AppResponse> {
        if self.id <= 0 {
            return Err(AppResponse::ValidationError(format!(
                "Product '{}' has non-positive id {}",
                self.name, self.id
            )));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppResponse::ValidationError(format!(
                "Product {} has invalid price {}",
                self.id, self.price
            )));
        }
        if self.colors.is_empty() {
            return Err(AppResponse::ValidationError(format!(
                "Product {} must offer at least one color",
                self.id
            )));
        }
        Ok(())
    }
}

/// Category-partitioned product universe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    categories: Vec<(String, Vec<Product>)>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids and malformed products.
    pub fn new(categories: Vec<(String, Vec<Product>)>) -> Result<Self, AppResponse> {
        {
            let mut seen = HashSet::new();
            let mut names = HashSet::new();

            for (category, products) in &categories {
                if !names.insert(category.as_str()) {
                    return Err(AppResponse::ValidationError(format!(
                        "Category '{category}' is declared twice"
                    )));
                }
                for product in products {
                    product.validate()?;
                    if !seen.insert(product.id) {
                        return Err(AppResponse::ValidationError(format!(
                            "Product id {} appears more than once in the catalog",
                            product.id
                        )));
                    }
                }
            }
        }

        Ok(Self { categories })
    }

    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Self::new(raw.0)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[Product])> {
        self.categories
            .iter()
            .map(|(name, products)| (name.as_str(), products.as_slice()))
    }

    pub fn category(&self, name: &str) -> Option<&[Product]> {
        self.categories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, products)| products.as_slice())
    }

    pub fn product_count(&self) -> usize {
        self.categories.iter().map(|(_, p)| p.len()).sum()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (name, products) in &self.categories {
            map.serialize_entry(name, products)?;
        }
        map.end()
    }
}

// Unvalidated, order-preserving form of the catalog document.
struct RawCatalog(Vec<(String, Vec<Product>)>);

impl<'de> Deserialize<'de> for RawCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = RawCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to product list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut categories = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, products)) = access.next_entry::<String, Vec<Product>>()? {
                    categories.push((name, products));
                }
                Ok(RawCatalog(categories))
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}
