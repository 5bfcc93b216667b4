//! Review route handlers.
//!
//! The review form is kept in the visitor's `review_draft` preference slot so
//! a failed submission can be retried without retyping.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
};
use serde::Serialize;
use tracing::instrument;

use raritone_core::{Review, ReviewDraft, ReviewId, ReviewSummary};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, Visitor};
use crate::routes::action_response;
use crate::services::{PreferenceStore, REVIEW_DRAFT_SLOT};
use crate::state::AppState;
use crate::workflows::ReviewComposer;

#[derive(Debug, Serialize)]
pub struct ReviewListView {
    pub summary: ReviewSummary,
    /// Average rounded to whole stars.
    pub stars: u8,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct DraftView {
    pub draft: ReviewDraft,
    pub submitting: bool,
}

/// List reviews, most recent first.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Json<ReviewListView> {
    let board = state.reviews().board();
    let summary = board.summary().await;
    Json(ReviewListView {
        summary,
        stars: summary.rounded_stars(),
        reviews: board.list().await,
    })
}

/// Show the saved draft.
#[instrument(skip_all, fields(visitor = %handle))]
pub async fn draft(
    State(state): State<AppState>,
    Visitor(handle): Visitor,
) -> Result<Json<DraftView>> {
    let slots = state.preferences().for_visitor(&handle).await;
    let draft = slots
        .load_json::<ReviewDraft>(REVIEW_DRAFT_SLOT)
        .await?
        .unwrap_or_default();

    Ok(Json(DraftView {
        draft,
        submitting: state.reviews().is_submitting(&handle),
    }))
}

/// Submit a review draft.
///
/// The draft is saved first. Once the review is accepted the saved draft is
/// cleared, unless a newer one has replaced it in the meantime.
///
/// A body that is not a draft is a bad request, except for anonymous
/// visitors, who are told to log in first.
#[instrument(skip_all, fields(visitor = %handle))]
pub async fn submit(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    Visitor(handle): Visitor,
    payload: std::result::Result<Json<ReviewDraft>, JsonRejection>,
) -> Result<Response> {
    add_breadcrumb("reviews", "Review submission requested", None);
    let toasts = state.toast_queue();

    let draft = match payload {
        Ok(Json(draft)) => draft,
        Err(rejection) if identity.is_some() => {
            return Err(AppError::BadRequest(rejection.body_text()));
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable review from anonymous visitor");
            let mut composer = ReviewComposer::new(handle);
            let outcome = composer.submit(None, state.reviews(), &toasts).await;
            return Ok(action_response(&toasts, outcome));
        }
    };

    let slots = state.preferences().for_visitor(&handle).await;
    {
        let _writer = slots.exclusive().await;
        slots.save_json(REVIEW_DRAFT_SLOT, &draft).await?;
    }

    let mut composer = ReviewComposer::with_draft(handle, draft.clone());
    let outcome = composer
        .submit(identity.as_ref(), state.reviews(), &toasts)
        .await;

    if outcome.is_ok() {
        let _writer = slots.exclusive().await;
        if slots.load_json::<ReviewDraft>(REVIEW_DRAFT_SLOT).await?.as_ref() == Some(&draft) {
            slots.remove(REVIEW_DRAFT_SLOT).await?;
        }
    }

    Ok(action_response(&toasts, outcome))
}

/// Count a helpful vote.
#[instrument(skip_all, fields(review_id = %id))]
pub async fn mark_helpful(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Json<Review>> {
    state
        .reviews()
        .board()
        .mark_helpful(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("review {id}")))
}
