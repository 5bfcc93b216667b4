//! Local preference store.
//!
//! Named slots of per-visitor data that survive page reloads. Slots are held
//! server-side under the visitor's session handle and written as soon as a
//! workflow saves them, independent of the session record.
//! [`MemoryPreferenceStore`] is the plain slot map underneath and backs tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::MutexGuard;

use raritone_core::SessionHandle;

/// Slot holding the JSON-encoded wishlist.
pub const WISHLIST_SLOT: &str = "wishlist";

/// Slot holding the JSON-encoded review form.
pub const REVIEW_DRAFT_SLOT: &str = "review_draft";

/// Upper bound on visitors whose slots are held at once.
const MAX_VISITORS: u64 = 100_000;

/// Errors that can occur when reading or writing preferences.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Payload could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Store rejected the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value persistence scoped to one visitor.
///
/// Every write replaces the whole slot.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a slot, `None` if it was never written.
    async fn load(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a slot.
    async fn save(&self, slot: &str, payload: String) -> Result<(), StorageError>;

    /// Delete a slot. Deleting a missing slot is not an error.
    async fn remove(&self, slot: &str) -> Result<(), StorageError>;
}

/// Preference slots for every visitor, keyed by session handle and evicted
/// after a period of inactivity.
#[derive(Clone)]
pub struct VisitorPreferences {
    visitors: Cache<SessionHandle, Arc<VisitorSlots>>,
}

impl VisitorPreferences {
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            visitors: Cache::builder()
                .max_capacity(MAX_VISITORS)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Slots of one visitor, created empty on first use.
    pub async fn for_visitor(&self, handle: &SessionHandle) -> Arc<VisitorSlots> {
        self.visitors
            .get_with(handle.clone(), async { Arc::new(VisitorSlots::default()) })
            .await
    }
}

/// One visitor's slots.
///
/// Reads and writes are individually atomic. A read-modify-write must hold
/// [`VisitorSlots::exclusive`] for its whole duration.
#[derive(Default)]
pub struct VisitorSlots {
    writer: tokio::sync::Mutex<()>,
    slots: MemoryPreferenceStore,
}

impl VisitorSlots {
    /// Wait until no other read-modify-write is running for this visitor.
    pub async fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Read and decode a JSON slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Encode` if the stored payload does not decode.
    pub async fn load_json<T: DeserializeOwned>(
        &self,
        slot: &str,
    ) -> Result<Option<T>, StorageError> {
        match self.load(slot).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Encode and write a JSON slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Encode` if `value` cannot be encoded.
    pub async fn save_json<T: Serialize + Sync>(
        &self,
        slot: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        self.save(slot, serde_json::to_string(value)?).await
    }
}

#[async_trait]
impl PreferenceStore for VisitorSlots {
    async fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
        self.slots.load(slot).await
    }

    async fn save(&self, slot: &str, payload: String) -> Result<(), StorageError> {
        self.slots.save(slot, payload).await
    }

    async fn remove(&self, slot: &str) -> Result<(), StorageError> {
        self.slots.remove(slot).await
    }
}

/// Preference slots held in process memory.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one slot.
    #[must_use]
    pub fn with_slot(slot: &str, payload: impl Into<String>) -> Self {
        let store = Self::new();
        store.lock().insert(slot.to_string(), payload.into());
        store
    }

    /// Current raw contents of a slot.
    #[must_use]
    pub fn raw(&self, slot: &str) -> Option<String> {
        self.lock().get(slot).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(slot))
    }

    async fn save(&self, slot: &str, payload: String) -> Result<(), StorageError> {
        self.lock().insert(slot.to_string(), payload);
        Ok(())
    }

    async fn remove(&self, slot: &str) -> Result<(), StorageError> {
        self.lock().remove(slot);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use raritone_core::ReviewDraft;

    use super::*;

    fn preferences() -> VisitorPreferences {
        VisitorPreferences::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_memory_store_overwrites_slot() {
        let store = MemoryPreferenceStore::with_slot(WISHLIST_SLOT, r#"["p1"]"#);
        store.save(WISHLIST_SLOT, r#"["p2"]"#.to_string()).await.unwrap();

        assert_eq!(
            store.load(WISHLIST_SLOT).await.unwrap().as_deref(),
            Some(r#"["p2"]"#)
        );
        assert!(store.load("other").await.unwrap().is_none());

        store.remove(WISHLIST_SLOT).await.unwrap();
        store.remove(WISHLIST_SLOT).await.unwrap();
        assert!(store.raw(WISHLIST_SLOT).is_none());
    }

    #[tokio::test]
    async fn test_visitor_slots_are_shared_per_handle() {
        let prefs = preferences();
        let first = prefs.for_visitor(&SessionHandle::new("s1")).await;
        first.save(WISHLIST_SLOT, r#"["p1"]"#.to_string()).await.unwrap();

        let again = prefs.for_visitor(&SessionHandle::new("s1")).await;
        assert_eq!(
            again.load(WISHLIST_SLOT).await.unwrap().as_deref(),
            Some(r#"["p1"]"#)
        );

        let other = prefs.for_visitor(&SessionHandle::new("s2")).await;
        assert!(other.load(WISHLIST_SLOT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_slot_round_trip() {
        let slots = preferences().for_visitor(&SessionHandle::new("s1")).await;
        let draft = ReviewDraft::new(4, "Nice", "Good fabric");

        assert!(
            slots
                .load_json::<ReviewDraft>(REVIEW_DRAFT_SLOT)
                .await
                .unwrap()
                .is_none()
        );
        slots.save_json(REVIEW_DRAFT_SLOT, &draft).await.unwrap();
        assert_eq!(
            slots.load_json::<ReviewDraft>(REVIEW_DRAFT_SLOT).await.unwrap(),
            Some(draft)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exclusive_serializes_read_modify_write() {
        let slots = preferences().for_visitor(&SessionHandle::new("s1")).await;
        slots.save(WISHLIST_SLOT, "0".to_string()).await.unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let slots = slots.clone();
                tokio::spawn(async move {
                    let _writer = slots.exclusive().await;
                    let current: u32 = slots
                        .load(WISHLIST_SLOT)
                        .await
                        .unwrap()
                        .unwrap()
                        .parse()
                        .unwrap();
                    tokio::task::yield_now().await;
                    slots
                        .save(WISHLIST_SLOT, (current + 1).to_string())
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(
            slots.load(WISHLIST_SLOT).await.unwrap().as_deref(),
            Some("50")
        );
    }
}
