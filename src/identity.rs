//! Authenticated identity and the change-notification hub.
//!
//! The host's auth SDK calls [`IdentityHub::publish`] whenever the signed-in
//! user changes; subscribers (e.g. the review form's reviewer name) resync on
//! every event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(default, rename = "displayName", alias = "display_name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    /// Display name, then email, then [`ANONYMOUS_NAME`]. Empty strings are
    /// treated as missing.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(ANONYMOUS_NAME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn Fn(Option<&Identity>) + Send + Sync>;

#[derive(Default)]
pub struct IdentityHub {
    current: RwLock<Option<Identity>>,
    handlers: Mutex<Vec<(SubscriptionId, Handler)>>,
    next_id: AtomicU64,
}

impl IdentityHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`. It is not called with the current identity;
    /// callers that need the initial value read [`IdentityHub::current`].
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(Option<&Identity>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.handlers.lock() {
            Ok(mut handlers) => handlers.push((id, Box::new(handler))),
            Err(_) => warn!("Identity handler list poisoned; subscription dropped"),
        }
        id
    }

    /// Returns false when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut handlers) = self.handlers.lock() else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().map(|h| h.len()).unwrap_or(0)
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.read().ok().and_then(|c| (*c).clone())
    }

    /// Records the new identity and notifies subscribers in registration order.
    /// Handlers run under the subscriber lock and must not (un)subscribe.
    pub fn publish(&self, identity: Option<Identity>) {
        match &identity {
            Some(user) => info!("Identity changed: signed in as {}", user.uid),
            None => info!("Identity changed: signed out"),
        }

        if let Ok(mut current) = self.current.write() {
            *current = identity.clone();
        }

        if let Ok(handlers) = self.handlers.lock() {
            for (_, handler) in handlers.iter() {
                handler(identity.as_ref());
            }
        }
    }

    pub fn sign_out(&self) {
        self.publish(None);
    }
}
