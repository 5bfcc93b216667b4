//! Identity and visitor extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use raritone_core::{Identity, SessionHandle};

use crate::error::AppError;
use crate::models::{session_keys, visitor_handle};

/// Extractor for the signed-in shopper, if any.
///
/// Never rejects. Workflows decide what an anonymous visitor may do.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<Identity>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(identity))
    }
}

/// Extractor for the visitor's session handle, created on first request.
pub struct Visitor(pub SessionHandle);

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        Ok(Self(visitor_handle(session).await?))
    }
}

/// Store the signed-in identity in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    identity: &Identity,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, identity).await
}

/// Remove the signed-in identity from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<Identity>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
