//! Reviews of one performance, or the caller's own reviews.
//!
//! Writing happens from a performance's page; editing and deleting work in either scope.

use super::FeatureState;
use crate::confirm::Confirmer;
use stagepass_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use stagepass_gateway::{
    CreateReviewRequest, Gateway, GatewayError, PerformanceId, Review, ReviewId,
    UpdateReviewRequest,
};
use std::sync::Arc;

/// Lowest and highest rating
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Shortest review text, after trimming
pub const MIN_CONTENT_CHARS: usize = 10;

const LOAD_FAILED: &str = "Failed to load reviews.";
const SAVE_FAILED: &str = "Failed to save the review.";
const DELETE_FAILED: &str = "Failed to delete the review.";
const ACCESS_DENIED: &str = "Access denied.";

// ============================================================================
// Drafts
// ============================================================================

/// Review text and rating as entered, before validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Rating as entered
    pub rating: u8,
    /// Text as entered
    pub content: String,
}

impl ReviewDraft {
    /// A draft from raw input
    #[must_use]
    pub fn new(rating: u8, content: impl Into<String>) -> Self {
        Self {
            rating,
            content: content.into(),
        }
    }

    /// Check the draft and return the rating and trimmed text to send
    ///
    /// # Errors
    ///
    /// [`GatewayError::Validation`] when the rating is outside 1–5 or the trimmed text
    /// is shorter than ten characters.
    pub fn validate(&self) -> Result<(u8, String), GatewayError> {
        if !RATING_RANGE.contains(&self.rating) {
            return Err(GatewayError::validation("Rating must be between 1 and 5."));
        }
        let content = self.content.trim();
        if content.chars().count() < MIN_CONTENT_CHARS {
            return Err(GatewayError::validation(
                "Review must be at least 10 characters.",
            ));
        }
        Ok((self.rating, content.to_string()))
    }
}

// ============================================================================
// State
// ============================================================================

/// Which reviews are shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewScope {
    /// Everyone's reviews of one performance
    Performance(PerformanceId),
    /// The caller's reviews, across performances
    Mine,
}

/// Reviews state
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewsState {
    /// What is listed
    pub scope: ReviewScope,
    /// Reviews, newest additions first
    pub reviews: Vec<Review>,
    /// A load is waiting on the gateway
    pub loading: bool,
    /// A create, update or delete is waiting on the gateway
    pub saving: bool,
    /// Last failure
    pub error: Option<GatewayError>,
}

impl ReviewsState {
    /// Empty state for `scope`
    #[must_use]
    pub const fn new(scope: ReviewScope) -> Self {
        Self {
            scope,
            reviews: Vec::new(),
            loading: false,
            saving: false,
            error: None,
        }
    }

    /// A review by id
    #[must_use]
    pub fn find(&self, id: ReviewId) -> Option<&Review> {
        self.reviews.iter().find(|review| review.id == id)
    }

    /// Mean rating of the listed reviews
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // review counts stay far below 2^52
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        Some(f64::from(total) / self.reviews.len() as f64)
    }
}

impl FeatureState for ReviewsState {
    fn last_error(&self) -> Option<&GatewayError> {
        self.error.as_ref()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Reviews actions
#[derive(Clone, Debug)]
pub enum ReviewsAction {
    // Commands
    /// Fetch the reviews in scope
    Load,
    /// Write a review of the scoped performance
    Create {
        /// What to write
        draft: ReviewDraft,
    },
    /// Rewrite a review
    Update {
        /// Which
        id: ReviewId,
        /// New rating and text
        draft: ReviewDraft,
    },
    /// Delete a review, after confirmation
    Delete {
        /// Which
        id: ReviewId,
    },

    // Events
    /// Reviews fetched
    Loaded {
        /// Reviews
        reviews: Vec<Review>,
    },
    /// Fetch failed
    LoadFailed {
        /// Why
        error: GatewayError,
    },
    /// Review written
    Created {
        /// As stored
        review: Review,
    },
    /// Review rewritten
    Updated {
        /// As stored
        review: Review,
    },
    /// Create or update refused
    SaveFailed {
        /// Why
        error: GatewayError,
    },
    /// The user said no
    DeleteDeclined,
    /// Review deleted
    Deleted {
        /// Which
        id: ReviewId,
    },
    /// Delete refused
    DeleteFailed {
        /// Why
        error: GatewayError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for reviews
#[derive(Clone)]
pub struct ReviewsEnvironment {
    /// Remote gateway
    pub gateway: Arc<dyn Gateway>,
    /// Asks the user before deleting
    pub confirmer: Arc<dyn Confirmer>,
}

impl ReviewsEnvironment {
    /// Creates a new `ReviewsEnvironment`
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, confirmer: Arc<dyn Confirmer>) -> Self {
        Self { gateway, confirmer }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for reviews
#[derive(Clone, Debug, Default)]
pub struct ReviewsReducer;

impl ReviewsReducer {
    /// Creates a new `ReviewsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Map a load failure for the caller's own reviews
    ///
    /// Not being signed in, or having no reviews yet, both read as an empty list.
    fn mine_load_failure(error: GatewayError) -> Option<GatewayError> {
        match error {
            GatewayError::Authentication { .. } | GatewayError::NotFound { .. } => None,
            GatewayError::Forbidden { .. } => Some(error.with_message(ACCESS_DENIED)),
            other => Some(other.or_message(LOAD_FAILED)),
        }
    }
}

impl Reducer for ReviewsReducer {
    type State = ReviewsState;
    type Action = ReviewsAction;
    type Environment = ReviewsEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ReviewsAction::Load => {
                state.loading = true;
                state.error = None;
                let gateway = Arc::clone(&env.gateway);
                let scope = state.scope;
                smallvec![Effect::Future(Box::pin(async move {
                    let result = match scope {
                        ReviewScope::Performance(id) => gateway.performance_reviews(id).await,
                        ReviewScope::Mine => gateway.my_reviews().await,
                    };
                    Some(match result {
                        Ok(reviews) => ReviewsAction::Loaded { reviews },
                        Err(error) => ReviewsAction::LoadFailed { error },
                    })
                }))]
            },

            ReviewsAction::Loaded { reviews } => {
                state.loading = false;
                state.reviews = reviews;
                smallvec![]
            },

            ReviewsAction::LoadFailed { error } => {
                state.loading = false;
                state.error = match state.scope {
                    ReviewScope::Mine => Self::mine_load_failure(error),
                    ReviewScope::Performance(_) => Some(error.or_message(LOAD_FAILED)),
                };
                if state.error.is_none() {
                    tracing::debug!("No reviews for this account");
                    state.reviews.clear();
                } else {
                    tracing::warn!(error = ?state.error, "Failed to load reviews");
                }
                smallvec![]
            },

            ReviewsAction::Create { draft } => {
                if state.saving {
                    return smallvec![];
                }
                let ReviewScope::Performance(performance_id) = state.scope else {
                    state.error = Some(GatewayError::validation(
                        "Open a performance to review it.",
                    ));
                    return smallvec![];
                };
                let (rating, content) = match draft.validate() {
                    Ok(valid) => valid,
                    Err(error) => {
                        state.error = Some(error);
                        return smallvec![];
                    },
                };
                state.saving = true;
                state.error = None;

                let request = CreateReviewRequest {
                    performance_id,
                    rating,
                    content,
                };
                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.create_review(request).await {
                        Ok(review) => ReviewsAction::Created { review },
                        Err(error) => ReviewsAction::SaveFailed { error },
                    })
                }))]
            },

            ReviewsAction::Update { id, draft } => {
                if state.saving {
                    return smallvec![];
                }
                let (rating, content) = match draft.validate() {
                    Ok(valid) => valid,
                    Err(error) => {
                        state.error = Some(error);
                        return smallvec![];
                    },
                };
                state.saving = true;
                state.error = None;

                let request = UpdateReviewRequest { rating, content };
                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.update_review(id, request).await {
                        Ok(review) => ReviewsAction::Updated { review },
                        Err(error) => ReviewsAction::SaveFailed { error },
                    })
                }))]
            },

            ReviewsAction::Delete { id } => {
                if state.saving {
                    return smallvec![];
                }
                state.saving = true;
                state.error = None;

                let gateway = Arc::clone(&env.gateway);
                let confirmer = Arc::clone(&env.confirmer);
                smallvec![Effect::Future(Box::pin(async move {
                    if !confirmer.confirm("Delete this review?".to_string()).await {
                        return Some(ReviewsAction::DeleteDeclined);
                    }
                    Some(match gateway.delete_review(id).await {
                        Ok(()) => ReviewsAction::Deleted { id },
                        Err(error) => ReviewsAction::DeleteFailed { error },
                    })
                }))]
            },

            ReviewsAction::Created { review } => {
                tracing::info!(review_id = %review.id, "Review created");
                state.saving = false;
                state.reviews.insert(0, review);
                smallvec![]
            },

            ReviewsAction::Updated { review } => {
                tracing::info!(review_id = %review.id, "Review updated");
                state.saving = false;
                match state.reviews.iter_mut().find(|r| r.id == review.id) {
                    Some(slot) => *slot = review,
                    None => state.reviews.insert(0, review),
                }
                smallvec![]
            },

            ReviewsAction::SaveFailed { error } => {
                tracing::warn!(%error, "Failed to save review");
                state.saving = false;
                state.error = Some(error.or_message(SAVE_FAILED));
                smallvec![]
            },

            ReviewsAction::DeleteDeclined => {
                state.saving = false;
                smallvec![]
            },

            ReviewsAction::Deleted { id } => {
                tracing::info!(review_id = %id, "Review deleted");
                state.saving = false;
                state.reviews.retain(|review| review.id != id);
                smallvec![]
            },

            ReviewsAction::DeleteFailed { error } => {
                tracing::warn!(%error, "Failed to delete review");
                state.saving = false;
                state.error = Some(error.or_message(DELETE_FAILED));
                smallvec![]
            },
        }
    }
}
