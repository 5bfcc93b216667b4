//! Review acceptance.
//!
//! There is no review backend yet. [`SimulatedReviewService`] stands in for
//! the network round trip by waiting a fixed latency and accepting.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use raritone_core::Review;

/// Errors a review backend can report.
#[derive(Debug, Error)]
pub enum ReviewServiceError {
    /// Backend not reachable.
    #[error("review service unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the review.
    #[error("review rejected: {0}")]
    Rejected(String),
}

/// Accepts synthesized reviews for publication.
#[async_trait]
pub trait ReviewPublisher: Send + Sync {
    async fn publish(&self, review: &Review) -> Result<(), ReviewServiceError>;
}

/// Accepts every review after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedReviewService {
    latency: Duration,
}

impl SimulatedReviewService {
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl ReviewPublisher for SimulatedReviewService {
    async fn publish(&self, review: &Review) -> Result<(), ReviewServiceError> {
        tokio::time::sleep(self.latency).await;
        tracing::debug!(review_id = %review.id, "review accepted");
        Ok(())
    }
}
