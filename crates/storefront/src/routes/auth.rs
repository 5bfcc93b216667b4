//! Authentication route handlers.
//!
//! Sign-in happens at the auth service. The storefront only exchanges the
//! resulting bearer token for an identity and keeps that in the session.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use raritone_core::Identity;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::state::AppState;

/// Sign-in request body.
#[derive(Deserialize)]
pub struct SignInRequest {
    pub token: String,
}

/// Resolve an auth-service token and remember the identity.
#[instrument(skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SignInRequest>,
) -> Result<Json<Identity>> {
    let token = SecretString::from(request.token);
    let identity = state.identity_provider().resolve_identity(&token).await?;

    session.cycle_id().await?;
    set_current_user(&session, &identity).await?;
    set_sentry_user(&identity.id, identity.display_name.as_deref());

    tracing::info!(user_id = %identity.id, "shopper signed in");
    Ok(Json(identity))
}

/// Forget the identity and destroy the session.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    clear_sentry_user();
    StatusCode::NO_CONTENT.into_response()
}
