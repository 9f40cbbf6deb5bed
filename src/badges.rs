//! Header badge counts: items in the cart and orders placed by the signed-in user.
//!
//! Everything here recomputes from already-fetched data; nothing is cached.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::config::StorefrontConfig;
use crate::identity::Identity;
use crate::product_model::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartLineItem {
    /// Builds a line for `product`, checking the selection against what the
    /// product offers.
    pub fn for_product(
        product: &Product,
        quantity: u32,
        color: &str,
        size: Option<&str>,
    ) -> Result<Self, AppResponse> {
        if quantity == 0 {
            return Err(AppResponse::ValidationError("Quantity must be at least 1".to_string()));
        }
        if !product.colors.iter().any(|c| c == color) {
            return Err(AppResponse::ValidationError(format!(
                "Color '{color}' is not offered for product {}",
                product.id
            )));
        }
        match (&product.sizes, size) {
            (Some(sizes), Some(size)) if sizes.iter().any(|s| s == size) => {}
            (None, None) => {}
            (Some(_), None) => {
                return Err(AppResponse::ValidationError(format!(
                    "A size must be selected for product {}",
                    product.id
                )))
            }
            (_, Some(size)) => {
                return Err(AppResponse::ValidationError(format!(
                    "Size '{size}' is not offered for product {}",
                    product.id
                )))
            }
        }

        Ok(Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            color: Some(color.to_string()),
            size: size.map(str::to_string),
            image: Some(product.img.clone()),
        })
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Sum of quantities, not the number of lines.
pub fn cart_badge_count(items: &[CartLineItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |total, item| total.saturating_add(item.quantity))
}

pub fn cart_subtotal(items: &[CartLineItem]) -> f64 {
    items.iter().map(CartLineItem::line_total).sum()
}

/// The remote document store, reduced to the one query shape used here.
pub trait DocumentQuery {
    fn query_where_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<JsonValue>, AppResponse>;
}

pub fn order_badge_count(records: &[JsonValue]) -> usize {
    records.len()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBadge {
    pub count: usize,
    /// Set when the count fell back to zero because the query failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<AppResponse>,
}

/// Counts the signed-in user's orders. Signed out means zero without a
/// query; a failed query degrades to zero with an alert for the UI.
pub fn fetch_order_badge(
    identity: Option<&Identity>,
    query: &dyn DocumentQuery,
    config: &StorefrontConfig,
) -> OrderBadge {
    let Some(user) = identity else {
        return OrderBadge { count: 0, alert: None };
    };

    match query.query_where_eq(&config.orders_collection, &config.orders_user_field, &user.uid) {
        Ok(records) => OrderBadge {
            count: order_badge_count(&records),
            alert: None,
        },
        Err(e) => {
            warn!("Order count query failed for {}: {e}", user.uid);
            let alert = match e {
                AppResponse::RemoteQueryFailure(_) => e,
                other => AppResponse::RemoteQueryFailure(other.to_string()),
            };
            OrderBadge {
                count: 0,
                alert: Some(alert),
            }
        }
    }
}
