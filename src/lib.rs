//! # Storefront Core
//!
//! Local logic behind a mobile storefront's product screen and header, exposed
//! to the UI host through a C ABI that exchanges JSON strings.
//!
//! ## What lives here
//!
//! - **Catalog lookup**: an immutable, category-partitioned product catalog
//!   injected at startup; lookup by id and "you may also like" suggestions.
//! - **Review cache**: per-product customer reviews persisted on device as one
//!   JSON blob under a single key of an LMDB-backed key-value store.
//! - **Badges**: cart quantity totals and the signed-in user's order count.
//! - **Identity hub**: the host pushes auth changes in; the review form's
//!   reviewer name follows them.
//!
//! Authentication, remote document queries and rendering stay on the host side.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::ffi::CString;
//! use storefront_core::{create_storefront, open_product};
//!
//! let config = CString::new(r#"{"db_name":"shop"}"#).unwrap();
//! let catalog = CString::new(
//!     r#"{"Drinkware":[{"id":10,"name":"Mug","price":12.5,"img":"mug.png","colors":["white"]}]}"#,
//! ).unwrap();
//! let state = create_storefront(config.as_ptr(), catalog.as_ptr());
//! let detail = open_product(state, 10);
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_storefront`] / [`close_storefront`] / [`free_storefront`]
//! - [`find_product`], [`related_products`], [`open_product`]
//! - [`load_reviews`], [`submit_review`], [`reviewer_name`]
//! - [`set_identity`], [`sign_out`]
//! - [`cart_badge_count`], [`order_badge_count`]
//! - [`free_response`] releases any string returned by the functions above
//!
//! Every returned string is a JSON-serialized [`AppResponse`].

pub mod app_response;
pub mod badges;
pub mod catalog;
pub mod config;
pub mod device_store;
pub mod identity;
pub mod local_db_state;
pub mod product_model;
pub mod review_form;
pub mod review_model;
pub mod review_store;
pub mod storefront;

pub use crate::app_response::AppResponse;

use crate::badges::{CartLineItem, OrderBadge};
use crate::config::StorefrontConfig;
use crate::identity::Identity;
use crate::local_db_state::AppDbState;
use crate::product_model::Catalog;
use crate::review_model::ReviewDraft;
use crate::storefront::Storefront;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// The storefront as handed to FFI callers.
pub type StorefrontState = Storefront<AppDbState>;

/// Creates a storefront backed by the LMDB device store named in the config.
///
/// # Parameters
///
/// * `config_json` - [`StorefrontConfig`] as JSON, or null for defaults
/// * `catalog_json` - the catalog as `{"<category>": [product, ...]}`
///
/// # Returns
///
/// A pointer to release with [`free_storefront`], or null when the config or
/// catalog is invalid or the device store cannot be opened.
///
/// # Safety
///
/// Both arguments must be null or valid null-terminated C strings. The
/// returned pointer is owned by the caller.
///
/// # Errors
///
/// Returns null if:
/// - `catalog_json` is null or not valid UTF-8
/// - the config or catalog fails to parse or validate
/// - the LMDB environment cannot be opened
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_storefront(
    config_json: *const c_char,
    catalog_json: *const c_char,
) -> *mut StorefrontState {
    let config = if config_json.is_null() {
        StorefrontConfig::default()
    } else {
        let raw = match unsafe { CStr::from_ptr(config_json).to_str() } {
            Ok(s) => s,
            Err(e) => {
                warn!("Invalid UTF-8 in config parameter: {e}");
                return std::ptr::null_mut();
            }
        };
        match StorefrontConfig::from_json(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Rejected storefront config: {e}");
                return std::ptr::null_mut();
            }
        }
    };

    if catalog_json.is_null() {
        warn!("Null catalog pointer passed to create_storefront");
        return std::ptr::null_mut();
    }

    let catalog = match unsafe { CStr::from_ptr(catalog_json).to_str() } {
        Ok(raw) => match Catalog::from_json(raw) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Rejected catalog: {e}");
                return std::ptr::null_mut();
            }
        },
        Err(e) => {
            warn!("Invalid UTF-8 in catalog parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match Storefront::open(config, catalog) {
        Ok(storefront) => {
            info!("✅ Storefront initialized");
            Box::into_raw(Box::new(storefront))
        }
        Err(e) => {
            warn!("❌ Failed to initialize storefront: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Looks a product up by id.
///
/// # Returns
///
/// `Ok` carrying the product JSON, or `NotFound` when the catalog has no
/// such id.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`] that has
/// not been passed to [`free_storefront`]. The returned string must be
/// released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn find_product(state: *mut StorefrontState, id: i64) -> *const c_char {
    let state = match state_ref(state, "find_product") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match state.find_product(id) {
        Ok(product) => ok_json(product),
        Err(e) => response_to_c_string(&e),
    }
}

/// Up to six same-category products, excluding `id`. An unknown id yields an
/// empty list rather than an error.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`] that has
/// not been passed to [`free_storefront`]. The returned string must be
/// released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn related_products(state: *mut StorefrontState, id: i64) -> *const c_char {
    let state = match state_ref(state, "related_products") {
        Ok(s) => s,
        Err(err) => return err,
    };

    ok_json(&state.related_products(id))
}

/// Product, default selections, related products and stored reviews in one
/// response.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`] that has
/// not been passed to [`free_storefront`]. The returned string must be
/// released with [`free_response`].
///
/// # Errors
///
/// `NotFound` for an unknown id. A failed review read does not fail the call;
/// it is reported in the detail's `reviews_alert`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn open_product(state: *mut StorefrontState, id: i64) -> *const c_char {
    let state = match state_ref(state, "open_product") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match state.open_product(id) {
        Ok(detail) => ok_json(&detail),
        Err(e) => response_to_c_string(&e),
    }
}

/// Reviews stored for `product_id`, oldest first.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`].
/// `product_id` must be null or a valid null-terminated C string. The returned
/// string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn load_reviews(state: *mut StorefrontState, product_id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "load_reviews") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let product_id = match c_ptr_to_string(product_id, "product_id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match state.load_reviews(&product_id) {
        Ok(reviews) => ok_json(&reviews),
        Err(e) => response_to_c_string(&e),
    }
}

/// Validates and appends a review.
///
/// # JSON Format
///
/// ```json
/// { "name": "optional, defaults to the signed-in user", "rating": 4,
///   "comment": "Great", "image": "optional uri" }
/// ```
///
/// On success returns the product's full review list. A `StorageFailure`
/// means the review was not saved.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`].
/// `product_id` and `review_json` must each be null or a valid
/// null-terminated C string. The returned string must be released with
/// [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn submit_review(
    state: *mut StorefrontState,
    product_id: *const c_char,
    draft_json: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "submit_review") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let product_id = match c_ptr_to_string(product_id, "product_id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let draft_str = match c_ptr_to_string(draft_json, "draft") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let draft: ReviewDraft = match serde_json::from_str(&draft_str) {
        Ok(d) => d,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid review JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    match state.submit_review(&product_id, draft) {
        Ok(reviews) => ok_json(&reviews),
        Err(e) => response_to_c_string(&e),
    }
}

/// Default reviewer name currently held by the review form.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`] that has
/// not been passed to [`free_storefront`]. The returned string must be
/// released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reviewer_name(state: *mut StorefrontState) -> *const c_char {
    let state = match state_ref(state, "reviewer_name") {
        Ok(s) => s,
        Err(err) => return err,
    };

    response_to_c_string(&AppResponse::success(state.reviewer_name()))
}

/// Forwards an auth state change from the host. A null pointer or the JSON
/// literal `null` means signed out.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`].
/// `identity_json` must be null or a valid null-terminated C string. The returned
/// string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_identity(state: *mut StorefrontState, identity_json: *const c_char) -> *const c_char {
    let state = match state_ref(state, "set_identity") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let identity: Option<Identity> = if identity_json.is_null() {
        None
    } else {
        let raw = match c_ptr_to_string(identity_json, "identity") {
            Ok(json) => json,
            Err(err) => return err,
        };
        match serde_json::from_str(&raw) {
            Ok(identity) => identity,
            Err(e) => {
                let error = AppResponse::SerializationError(format!("Invalid identity JSON: {e}"));
                return response_to_c_string(&error);
            }
        }
    };

    state.set_identity(identity);
    response_to_c_string(&AppResponse::success(state.reviewer_name()))
}

/// Clears the current identity. Always succeeds for a live storefront.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`] that has
/// not been passed to [`free_storefront`]. The returned string must be
/// released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn sign_out(state: *mut StorefrontState) -> *const c_char {
    let state = match state_ref(state, "sign_out") {
        Ok(s) => s,
        Err(err) => return err,
    };

    state.sign_out();
    response_to_c_string(&AppResponse::success("Signed out"))
}

/// Sum of quantities over a JSON array of cart lines.
///
/// # Safety
///
/// `items_json` must be null or a valid null-terminated C string. The
/// returned string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn cart_badge_count(items_json: *const c_char) -> *const c_char {
    let raw = match c_ptr_to_string(items_json, "cart items") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let items: Vec<CartLineItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid cart JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    response_to_c_string(&AppResponse::success(badges::cart_badge_count(&items).to_string()))
}

/// Order badge from the documents the host fetched for the signed-in user.
/// Zero when nobody is signed in.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`].
/// `records_json` must be null or a valid null-terminated C string. The returned
/// string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn order_badge_count(state: *mut StorefrontState, records_json: *const c_char) -> *const c_char {
    let state = match state_ref(state, "order_badge_count") {
        Ok(s) => s,
        Err(err) => return err,
    };

    if state.identity().current().is_none() {
        return ok_json(&OrderBadge { count: 0, alert: None });
    }

    let raw = match c_ptr_to_string(records_json, "order records") {
        Ok(json) => json,
        Err(err) => return err,
    };

    match serde_json::from_str::<Vec<JsonValue>>(&raw) {
        Ok(records) => ok_json(&OrderBadge {
            count: badges::order_badge_count(&records),
            alert: None,
        }),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid order records JSON: {e}"));
            response_to_c_string(&error)
        }
    }
}

/// Flushes and closes the device store. The pointer stays valid until
/// [`free_storefront`], but store-backed calls fail afterwards.
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_storefront`] that has
/// not been passed to [`free_storefront`]. The returned string must be
/// released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_storefront(state: *mut StorefrontState) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer passed to close_storefront".to_string());
            return response_to_c_string(&error);
        }
    };

    match state.close() {
        Ok(_) => response_to_c_string(&AppResponse::success("Storefront closed successfully")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Releases a pointer returned by [`create_storefront`]. Null is ignored.
///
/// # Safety
///
/// The pointer must not be used again, and must not be freed twice.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_storefront(state: *mut StorefrontState) {
    if !state.is_null() {
        drop(unsafe { Box::from_raw(state) });
    }
}

/// Releases a string returned by any function in this crate. Null is ignored.
///
/// # Safety
///
/// `ptr` must come from this crate and must not be freed twice.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr as *mut c_char) });
    }
}

fn state_ref<'a>(state: *mut StorefrontState, caller: &str) -> Result<&'a StorefrontState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(s) => Ok(s),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
            Err(response_to_c_string(&error))
        }
    }
}

/// Wraps `value` as an `Ok` response carrying its JSON text.
fn ok_json<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Failed to serialize result: {e}"));
            response_to_c_string(&error)
        }
    }
}

/// Serializes `response` into a heap C string owned by the caller; null if
/// serialization fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Null pointers and invalid UTF-8 become a `BadRequest` response.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
