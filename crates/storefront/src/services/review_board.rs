//! In-memory review list.
//!
//! Reviews are held for the lifetime of the process, most recent first.

use chrono::NaiveDate;
use tokio::sync::RwLock;

use raritone_core::{Rating, Review, ReviewId, ReviewSummary, UserId};

struct LaunchReview {
    user_id: &'static str,
    user_name: &'static str,
    stars: u8,
    title: &'static str,
    comment: &'static str,
    date: (i32, u32, u32),
    helpful_count: u32,
    verified: bool,
}

/// Reviews shown before any shopper has posted.
const LAUNCH_REVIEWS: &[LaunchReview] = &[
    LaunchReview {
        user_id: "user1",
        user_name: "Priya Sharma",
        stars: 5,
        title: "Amazing AI Technology!",
        comment: "The body scan feature is incredible. Perfect fit every time and the quality is outstanding. Highly recommend!",
        date: (2024, 12, 15),
        helpful_count: 12,
        verified: true,
    },
    LaunchReview {
        user_id: "user2",
        user_name: "Arjun Patel",
        stars: 5,
        title: "Revolutionary Shopping Experience",
        comment: "Never thought online shopping could be this accurate. The virtual try-on saved me so much time and hassle.",
        date: (2024, 12, 10),
        helpful_count: 8,
        verified: true,
    },
    LaunchReview {
        user_id: "user3",
        user_name: "Sneha Reddy",
        stars: 4,
        title: "Great Quality, Fast Delivery",
        comment: "Love the personalized recommendations. The AI really understands my style preferences. Minor issue with delivery timing.",
        date: (2024, 12, 5),
        helpful_count: 5,
        verified: false,
    },
    LaunchReview {
        user_id: "user4",
        user_name: "Vikram Singh",
        stars: 5,
        title: "Best Fashion App Ever!",
        comment: "The technology is mind-blowing. Perfect measurements, great quality clothes, and excellent customer service.",
        date: (2024, 11, 28),
        helpful_count: 15,
        verified: true,
    },
];

fn launch_reviews() -> Vec<Review> {
    LAUNCH_REVIEWS
        .iter()
        .filter_map(|seed| {
            let (year, month, day) = seed.date;
            Some(Review {
                id: ReviewId::now(),
                user_id: UserId::new(seed.user_id),
                user_name: seed.user_name.to_string(),
                rating: Rating::new(seed.stars).ok()?,
                title: Some(seed.title.to_string()),
                comment: seed.comment.to_string(),
                date: NaiveDate::from_ymd_opt(year, month, day)?,
                helpful_count: seed.helpful_count,
                verified: seed.verified,
            })
        })
        .collect()
}

/// The displayed review list.
pub struct ReviewBoard {
    reviews: RwLock<Vec<Review>>,
}

impl ReviewBoard {
    /// Board holding `reviews`, most recent first.
    #[must_use]
    pub fn new(reviews: Vec<Review>) -> Self {
        Self {
            reviews: RwLock::new(reviews),
        }
    }

    /// Board seeded with the launch reviews.
    #[must_use]
    pub fn with_launch_reviews() -> Self {
        Self::new(launch_reviews())
    }

    /// All reviews, most recent first.
    pub async fn list(&self) -> Vec<Review> {
        self.reviews.read().await.clone()
    }

    pub async fn summary(&self) -> ReviewSummary {
        ReviewSummary::from_reviews(&self.reviews.read().await)
    }

    pub async fn len(&self) -> usize {
        self.reviews.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reviews.read().await.is_empty()
    }

    /// Put a review at the head of the list.
    pub async fn prepend(&self, review: Review) {
        self.reviews.write().await.insert(0, review);
    }

    /// Count one more "helpful" vote. `None` if the review does not exist.
    pub async fn mark_helpful(&self, id: &ReviewId) -> Option<Review> {
        let mut reviews = self.reviews.write().await;
        let review = reviews.iter_mut().find(|review| &review.id == id)?;
        review.helpful_count = review.helpful_count.saturating_add(1);
        Some(review.clone())
    }
}
