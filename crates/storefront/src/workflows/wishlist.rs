//! Wishlist toggle workflow.
//!
//! A [`WishlistView`] reads the visitor's wishlist slot once, then writes the
//! whole set back after every toggle. The in-memory copy only changes once
//! the write has succeeded, so a failed write leaves the view as it was.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use raritone_core::{ProductId, SessionHandle, ToastNotification, Wishlist};

use crate::services::{
    NotificationChannel, PreferenceStore, StorageError, WISHLIST_SLOT, WishlistChanged,
    WishlistSignal,
};

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("product id must not be empty")]
    EmptyProductId,

    #[error("wishlist storage error: {0}")]
    Storage(#[from] StorageError),
}

impl WishlistError {
    #[must_use]
    pub fn toast(&self) -> ToastNotification {
        match self {
            Self::EmptyProductId => {
                ToastNotification::warning("Invalid Selection", "Please choose a valid product.")
            }
            Self::Storage(_) => ToastNotification::error(
                "Wishlist Unavailable",
                "We couldn't update your wishlist. Please try again.",
            ),
        }
    }
}

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WishlistChangeResult {
    pub now_present: bool,
}

/// A mounted wishlist for one visitor.
pub struct WishlistView<'a> {
    store: &'a dyn PreferenceStore,
    owner: SessionHandle,
    wishlist: Wishlist,
}

impl<'a> WishlistView<'a> {
    /// Load the wishlist slot.
    ///
    /// A payload that does not decode is logged and treated as an empty
    /// wishlist; the next toggle overwrites it.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Storage` if the slot cannot be read.
    pub async fn mount(
        store: &'a dyn PreferenceStore,
        owner: SessionHandle,
    ) -> Result<Self, WishlistError> {
        let wishlist = match store.load(WISHLIST_SLOT).await? {
            Some(payload) => Wishlist::from_json(&payload).unwrap_or_else(|e| {
                tracing::warn!(error = %e, owner = %owner, "discarding unreadable wishlist");
                Wishlist::new()
            }),
            None => Wishlist::new(),
        };

        Ok(Self {
            store,
            owner,
            wishlist,
        })
    }

    #[must_use]
    pub const fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    #[must_use]
    pub const fn owner(&self) -> &SessionHandle {
        &self.owner
    }

    /// Flip membership of `product_id`, persist, notify, then signal.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::EmptyProductId` for a blank id and
    /// `WishlistError::Storage` if the write fails. On error one toast has
    /// been shown and no signal published.
    #[instrument(skip(self, notifications, signal), fields(owner = %self.owner))]
    pub async fn toggle(
        &mut self,
        product_id: &ProductId,
        notifications: &dyn NotificationChannel,
        signal: &WishlistSignal,
    ) -> Result<WishlistChangeResult, WishlistError> {
        match self.persist_toggle(product_id).await {
            Ok(now_present) => {
                notifications.show_toast(if now_present {
                    ToastNotification::success(
                        "Added to Wishlist",
                        "Item has been saved to your wishlist!",
                    )
                } else {
                    ToastNotification::info(
                        "Removed from Wishlist",
                        "Item has been removed from your wishlist.",
                    )
                });
                signal.publish(WishlistChanged {
                    owner: self.owner.clone(),
                    product_id: product_id.clone(),
                    now_present,
                });
                Ok(WishlistChangeResult { now_present })
            }
            Err(err) => {
                tracing::warn!(error = %err, "wishlist toggle failed");
                notifications.show_toast(err.toast());
                Err(err)
            }
        }
    }

    async fn persist_toggle(&mut self, product_id: &ProductId) -> Result<bool, WishlistError> {
        if product_id.is_blank() {
            return Err(WishlistError::EmptyProductId);
        }

        let mut next = self.wishlist.clone();
        let now_present = next.toggle(product_id);
        self.store
            .save(WISHLIST_SLOT, next.to_json().map_err(StorageError::from)?)
            .await?;

        self.wishlist = next;
        Ok(now_present)
    }
}

/// Mount the visitor's wishlist and toggle one product.
///
/// # Errors
///
/// Same as [`WishlistView::toggle`]. A failed mount also shows one toast.
pub async fn toggle_wishlist(
    store: &dyn PreferenceStore,
    owner: SessionHandle,
    product_id: &ProductId,
    notifications: &dyn NotificationChannel,
    signal: &WishlistSignal,
) -> Result<WishlistChangeResult, WishlistError> {
    let mut view = match WishlistView::mount(store, owner).await {
        Ok(view) => view,
        Err(err) => {
            tracing::warn!(error = %err, "wishlist mount failed");
            notifications.show_toast(err.toast());
            return Err(err);
        }
    };
    view.toggle(product_id, notifications, signal).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use raritone_core::ToastKind;

    use super::*;
    use crate::services::{MemoryPreferenceStore, ToastQueue};

    /// Reads succeed, writes always fail.
    struct ReadOnlyStore(MemoryPreferenceStore);

    #[async_trait]
    impl PreferenceStore for ReadOnlyStore {
        async fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
            self.0.load(slot).await
        }

        async fn save(&self, _slot: &str, _payload: String) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        async fn remove(&self, _slot: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    fn toasts() -> ToastQueue {
        ToastQueue::new(5, Duration::from_secs(5))
    }

    fn owner() -> SessionHandle {
        SessionHandle::new("s1")
    }

    #[tokio::test]
    async fn test_toggle_add_then_remove() {
        let store = MemoryPreferenceStore::new();
        let toasts = toasts();
        let signal = WishlistSignal::default();
        let mut events = signal.subscribe();
        let p1 = ProductId::new("p1");

        let mut view = WishlistView::mount(&store, owner()).await.unwrap();
        let added = view.toggle(&p1, &toasts, &signal).await.unwrap();

        assert!(added.now_present);
        assert_eq!(store.raw(WISHLIST_SLOT).as_deref(), Some(r#"["p1"]"#));
        let change = events.try_recv().unwrap();
        assert_eq!(change.owner, owner());
        assert!(change.now_present);
        assert!(events.try_recv().is_none());
        let shown = toasts.take_all();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown.first().unwrap().kind, ToastKind::Success);
        assert_eq!(shown.first().unwrap().title, "Added to Wishlist");

        let removed = view.toggle(&p1, &toasts, &signal).await.unwrap();

        assert!(!removed.now_present);
        assert!(view.wishlist().is_empty());
        assert_eq!(store.raw(WISHLIST_SLOT).as_deref(), Some("[]"));
        assert!(!events.try_recv().unwrap().now_present);
        assert!(events.try_recv().is_none());
        let shown = toasts.take_all();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown.first().unwrap().kind, ToastKind::Info);
    }

    #[tokio::test]
    async fn test_double_toggle_persists_original_set() {
        let store = MemoryPreferenceStore::with_slot(WISHLIST_SLOT, r#"["p0","p2"]"#);
        let toasts = toasts();
        let signal = WishlistSignal::default();
        let p1 = ProductId::new("p1");

        let mut view = WishlistView::mount(&store, owner()).await.unwrap();
        let original = view.wishlist().clone();
        view.toggle(&p1, &toasts, &signal).await.unwrap();
        view.toggle(&p1, &toasts, &signal).await.unwrap();

        assert_eq!(view.wishlist(), &original);
        let persisted = Wishlist::from_json(&store.raw(WISHLIST_SLOT).unwrap()).unwrap();
        assert_eq!(persisted, original);
    }

    #[tokio::test]
    async fn test_mount_discards_corrupt_payload() {
        let store = MemoryPreferenceStore::with_slot(WISHLIST_SLOT, "not json");
        let view = WishlistView::mount(&store, owner()).await.unwrap();
        assert!(view.wishlist().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_view_and_skips_signal() {
        let store = ReadOnlyStore(MemoryPreferenceStore::with_slot(WISHLIST_SLOT, r#"["p1"]"#));
        let toasts = toasts();
        let signal = WishlistSignal::default();
        let mut events = signal.subscribe();

        let mut view = WishlistView::mount(&store, owner()).await.unwrap();
        let result = view.toggle(&ProductId::new("p2"), &toasts, &signal).await;

        assert!(matches!(result, Err(WishlistError::Storage(_))));
        assert_eq!(view.wishlist().entries(), &[ProductId::new("p1")]);
        assert!(events.try_recv().is_none());
        let shown = toasts.take_all();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown.first().unwrap().kind, ToastKind::Error);
    }

    #[tokio::test]
    async fn test_blank_product_id_rejected() {
        let store = MemoryPreferenceStore::new();
        let toasts = toasts();
        let signal = WishlistSignal::default();

        let result =
            toggle_wishlist(&store, owner(), &ProductId::new(" "), &toasts, &signal).await;

        assert!(matches!(result, Err(WishlistError::EmptyProductId)));
        assert!(store.raw(WISHLIST_SLOT).is_none());
        assert_eq!(toasts.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_wishlist_mounts_from_store() {
        let store = MemoryPreferenceStore::with_slot(WISHLIST_SLOT, r#"["p1"]"#);
        let toasts = toasts();
        let signal = WishlistSignal::default();

        let result = toggle_wishlist(&store, owner(), &ProductId::new("p1"), &toasts, &signal)
            .await
            .unwrap();

        assert!(!result.now_present);
        assert_eq!(store.raw(WISHLIST_SLOT).as_deref(), Some("[]"));
    }
}
