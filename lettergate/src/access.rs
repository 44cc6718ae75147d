//! Shared unlock flag with durable key-value persistence.
//!
//! [`AccessState`] is the single piece of state shared across the gate, the
//! editor, and export. It has exactly one writer site (the provider
//! selector on success) and is read-only everywhere else. Every mutation is
//! mirrored synchronously into a [`KeyValueStore`] under two stable keys:
//!
//! - `"hasPaid"` - the unlock flag, stored as the string `"true"`/`"false"`
//! - `"paymentDetails"` - the receipt as JSON, removed entirely when cleared
//!
//! Absence of a stored value always reads as locked / no receipt.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::timestamp::UnixTimestamp;

/// Storage key for the unlock flag.
pub const UNLOCK_KEY: &str = "hasPaid";

/// Storage key for the persisted payment details.
pub const DETAILS_KEY: &str = "paymentDetails";

/// Durable string key-value storage scoped to the browsing session.
///
/// Implementations must apply writes before returning so that a crash
/// between a state change and its mirror cannot be observed.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`, replacing any earlier value.
    fn set(&self, key: &str, value: &str);
    /// Removes `key` entirely; a later [`Self::get`] returns `None`.
    fn remove(&self, key: &str);
}

/// In-memory [`KeyValueStore`], the default backing for tests and
/// single-process hosts.
#[derive(Debug, Default)]
pub struct MemoryStore(Mutex<HashMap<String, String>>);

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.lock().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.0
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.0.lock().expect("store lock poisoned").remove(key);
    }
}

/// Proof-of-payment receipt recorded when a session succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Amount charged.
    pub amount: f64,
    /// ISO currency code (e.g. `"USD"`, `"KES"`).
    pub currency: String,
    /// Provider transaction reference.
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    /// When the payment succeeded.
    pub timestamp: UnixTimestamp,
}

/// Whether an unlock survives beyond the session that paid for it.
///
/// The original behavior was contradictory (one code path reset the flag on
/// every load, another persisted it indefinitely); the policy is therefore
/// an explicit configuration decision here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    /// Pay per session: construction resets the flag to locked and clears
    /// any stored receipt. This is the default.
    #[default]
    PerSession,
    /// Pay once: construction adopts whatever the store holds.
    Persistent,
}

struct AccessInner {
    unlocked: bool,
    details: Option<PaymentDetails>,
}

/// The shared access flag and its persistence.
///
/// Single writer (the provider selector on success), many readers.
pub struct AccessState {
    store: Box<dyn KeyValueStore>,
    inner: Mutex<AccessInner>,
}

impl fmt::Debug for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessState")
            .field("unlocked", &self.get())
            .finish_non_exhaustive()
    }
}

impl Default for AccessState {
    fn default() -> Self {
        Self::new(Box::new(MemoryStore::new()), AccessPolicy::default())
    }
}

impl AccessState {
    /// Creates an access state backed by `store` under the given policy.
    ///
    /// [`AccessPolicy::PerSession`] writes `"false"` and removes any stored
    /// receipt immediately; [`AccessPolicy::Persistent`] reads the stored
    /// flag and receipt, treating absence as locked.
    #[must_use]
    pub fn new(store: Box<dyn KeyValueStore>, policy: AccessPolicy) -> Self {
        let inner = match policy {
            AccessPolicy::PerSession => {
                store.set(UNLOCK_KEY, "false");
                store.remove(DETAILS_KEY);
                AccessInner {
                    unlocked: false,
                    details: None,
                }
            }
            AccessPolicy::Persistent => {
                let unlocked = store
                    .get(UNLOCK_KEY)
                    .is_some_and(|value| value == "true");
                let details = store
                    .get(DETAILS_KEY)
                    .and_then(|json| serde_json::from_str(&json).ok());
                AccessInner { unlocked, details }
            }
        };
        Self {
            store,
            inner: Mutex::new(inner),
        }
    }

    /// Returns the unlock flag.
    #[must_use]
    pub fn get(&self) -> bool {
        self.inner.lock().expect("access lock poisoned").unlocked
    }

    /// Sets the unlock flag and mirrors it into storage.
    pub fn set(&self, unlocked: bool) {
        self.inner.lock().expect("access lock poisoned").unlocked = unlocked;
        self.store
            .set(UNLOCK_KEY, if unlocked { "true" } else { "false" });
    }

    /// Returns the recorded payment details, if any.
    #[must_use]
    pub fn details(&self) -> Option<PaymentDetails> {
        self.inner
            .lock()
            .expect("access lock poisoned")
            .details
            .clone()
    }

    /// Records or clears the payment details, mirroring into storage.
    ///
    /// Clearing removes the stored key entirely rather than leaving an
    /// empty object behind.
    pub fn set_details(&self, details: Option<PaymentDetails>) {
        match &details {
            Some(d) => {
                if let Ok(json) = serde_json::to_string(d) {
                    self.store.set(DETAILS_KEY, &json);
                }
            }
            None => self.store.remove(DETAILS_KEY),
        }
        self.inner.lock().expect("access lock poisoned").details = details;
    }
}
