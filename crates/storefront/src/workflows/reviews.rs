//! Review submission workflow.
//!
//! A [`ReviewComposer`] holds one shopper's draft and walks it through
//! `Editing -> Validating -> Submitting -> Settled -> Editing`. The shared
//! [`ReviewWorkflow`] owns the board, the publisher and the set of
//! submitters with a submission in flight.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::instrument;

use raritone_core::{
    Identity, Rating, Review, ReviewDraft, ReviewId, SessionHandle, Settlement, SubmissionState,
    ToastNotification,
};

use crate::services::{NotificationChannel, ReviewBoard, ReviewPublisher, ReviewServiceError};

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("login required to submit a review")]
    Unauthenticated,

    #[error("a star rating is required")]
    MissingRating,

    #[error("a review comment is required")]
    MissingComment,

    #[error("a review is already being submitted")]
    SubmissionInFlight,

    #[error("review service error: {0}")]
    Service(#[from] ReviewServiceError),
}

impl ReviewError {
    #[must_use]
    pub fn toast(&self) -> ToastNotification {
        match self {
            Self::Unauthenticated => {
                ToastNotification::warning("Login Required", "Please login to submit a review.")
            }
            Self::MissingRating => {
                ToastNotification::warning("Rating Required", "Please select a star rating.")
            }
            Self::MissingComment => {
                ToastNotification::warning("Comment Required", "Please write a review comment.")
            }
            Self::SubmissionInFlight => ToastNotification::warning(
                "Submission In Progress",
                "Your review is still being submitted.",
            ),
            Self::Service(_) => ToastNotification::error(
                "Submission Failed",
                "We couldn't post your review. Please try again.",
            ),
        }
    }
}

/// Check a draft in order: identity, rating, comment. The first failure wins.
///
/// # Errors
///
/// Returns `Unauthenticated`, `MissingRating` or `MissingComment`.
pub fn validate_draft<'a>(
    identity: Option<&'a Identity>,
    draft: &ReviewDraft,
) -> Result<(&'a Identity, Rating), ReviewError> {
    let identity = identity.ok_or(ReviewError::Unauthenticated)?;
    let rating = draft.selected_rating().ok_or(ReviewError::MissingRating)?;
    if draft.comment.trim().is_empty() {
        return Err(ReviewError::MissingComment);
    }
    Ok((identity, rating))
}

/// Build the review a validated draft becomes.
#[must_use]
pub fn synthesize_review(
    identity: &Identity,
    rating: Rating,
    draft: &ReviewDraft,
    today: NaiveDate,
) -> Review {
    let title = (!draft.title.trim().is_empty()).then(|| draft.title.clone());

    Review {
        id: ReviewId::now(),
        user_id: identity.id.clone(),
        user_name: identity.display_name_or_anonymous().to_string(),
        rating,
        title,
        comment: draft.comment.clone(),
        date: today,
        helpful_count: 0,
        verified: false,
    }
}

/// Marks a submitter as busy until dropped.
pub struct SubmissionGuard<'a> {
    in_flight: &'a Mutex<HashSet<SessionHandle>>,
    submitter: SessionHandle,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.submitter);
    }
}

pub struct ReviewWorkflow {
    board: Arc<ReviewBoard>,
    publisher: Arc<dyn ReviewPublisher>,
    in_flight: Mutex<HashSet<SessionHandle>>,
}

impl ReviewWorkflow {
    #[must_use]
    pub fn new(board: Arc<ReviewBoard>, publisher: Arc<dyn ReviewPublisher>) -> Self {
        Self {
            board,
            publisher,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub const fn board(&self) -> &Arc<ReviewBoard> {
        &self.board
    }

    #[must_use]
    pub fn is_submitting(&self, submitter: &SessionHandle) -> bool {
        self.lock().contains(submitter)
    }

    /// Claim the submit slot for `submitter`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::SubmissionInFlight` if a submission from the same
    /// submitter has not settled yet.
    pub fn begin(&self, submitter: &SessionHandle) -> Result<SubmissionGuard<'_>, ReviewError> {
        if !self.lock().insert(submitter.clone()) {
            return Err(ReviewError::SubmissionInFlight);
        }
        Ok(SubmissionGuard {
            in_flight: &self.in_flight,
            submitter: submitter.clone(),
        })
    }

    /// Hand a review to the publisher and prepend it once accepted.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Service` if the publisher refuses the review.
    pub async fn publish(&self, review: Review) -> Result<Review, ReviewError> {
        self.publisher.publish(&review).await?;
        self.board.prepend(review.clone()).await;
        Ok(review)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<SessionHandle>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One shopper's review form.
#[derive(Debug, Clone)]
pub struct ReviewComposer {
    submitter: SessionHandle,
    draft: ReviewDraft,
    state: SubmissionState,
    last_settlement: Option<Settlement>,
}

impl ReviewComposer {
    #[must_use]
    pub fn new(submitter: SessionHandle) -> Self {
        Self::with_draft(submitter, ReviewDraft::default())
    }

    #[must_use]
    pub const fn with_draft(submitter: SessionHandle, draft: ReviewDraft) -> Self {
        Self {
            submitter,
            draft,
            state: SubmissionState::Editing,
            last_settlement: None,
        }
    }

    #[must_use]
    pub const fn draft(&self) -> &ReviewDraft {
        &self.draft
    }

    #[must_use]
    pub const fn state(&self) -> SubmissionState {
        self.state
    }

    /// How the most recent submission that reached the publisher ended.
    #[must_use]
    pub const fn last_settlement(&self) -> Option<Settlement> {
        self.last_settlement
    }

    /// Replace the draft and return to editing.
    pub fn edit(&mut self, draft: ReviewDraft) {
        self.draft = draft;
        self.state = SubmissionState::Editing;
    }

    /// Validate and submit the current draft.
    ///
    /// On acceptance the review is at the head of the board and the draft is
    /// cleared. On any failure the draft is kept. The composer is back in
    /// `Editing` when this returns.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, `SubmissionInFlight` if this
    /// submitter is already submitting, or `Service` if the publisher
    /// refuses. Each failure shows one toast.
    #[instrument(skip_all, fields(submitter = %self.submitter))]
    pub async fn submit(
        &mut self,
        identity: Option<&Identity>,
        workflow: &ReviewWorkflow,
        notifications: &dyn NotificationChannel,
    ) -> Result<Review, ReviewError> {
        let result = self.run(identity, workflow).await;
        if let SubmissionState::Settled(settlement) = self.state {
            self.last_settlement = Some(settlement);
            self.state = SubmissionState::Editing;
        }
        match &result {
            Ok(review) => {
                tracing::info!(review_id = %review.id, rating = review.rating.stars(), "review posted");
                notifications.show_toast(ToastNotification::success(
                    "Review Submitted!",
                    "Thank you for your feedback. Your review has been posted.",
                ));
            }
            Err(err) => {
                tracing::warn!(error = %err, "review submission failed");
                notifications.show_toast(err.toast());
            }
        }
        result
    }

    async fn run(
        &mut self,
        identity: Option<&Identity>,
        workflow: &ReviewWorkflow,
    ) -> Result<Review, ReviewError> {
        let _guard = workflow.begin(&self.submitter)?;

        self.state = SubmissionState::Validating;
        let (identity, rating) = match validate_draft(identity, &self.draft) {
            Ok(valid) => valid,
            Err(err) => {
                self.state = SubmissionState::Editing;
                return Err(err);
            }
        };

        self.state = SubmissionState::Submitting;
        let review = synthesize_review(identity, rating, &self.draft, Utc::now().date_naive());
        match workflow.publish(review).await {
            Ok(review) => {
                self.draft = ReviewDraft::default();
                self.state = SubmissionState::Settled(Settlement::Accepted);
                Ok(review)
            }
            Err(err) => {
                self.state = SubmissionState::Settled(Settlement::Rejected);
                Err(err)
            }
        }
    }
}
