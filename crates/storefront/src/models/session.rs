//! Session-stored visitor state.

use tower_sessions::Session;

use raritone_core::SessionHandle;

/// Session keys for visitor data.
pub mod keys {
    /// Identity of the signed-in shopper.
    pub const CURRENT_USER: &str = "current_user";

    /// Random per-visitor handle keying local carts, preferences and wishlist
    /// signals.
    pub const SESSION_HANDLE: &str = "session_handle";
}

/// Read the visitor's handle, creating one on first use.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn visitor_handle(session: &Session) -> Result<SessionHandle, tower_sessions::session::Error> {
    if let Some(handle) = session.get::<SessionHandle>(keys::SESSION_HANDLE).await? {
        return Ok(handle);
    }

    let handle = SessionHandle::generate();
    session.insert(keys::SESSION_HANDLE, &handle).await?;
    tracing::debug!(handle = %handle, "new visitor handle");
    Ok(handle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_visitor_handle_is_stable() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let first = visitor_handle(&session).await.unwrap();
        let second = visitor_handle(&session).await.unwrap();

        assert!(!first.is_blank());
        assert_eq!(first, second);
    }
}
