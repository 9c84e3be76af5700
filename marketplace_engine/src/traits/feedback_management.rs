use thiserror::Error;

use crate::{
    db_types::{Feedback, NewFeedback},
    traits::CatalogApiError,
};

/// Feedback persistence and rating aggregation operations a backend must provide.
#[allow(async_fn_in_trait)]
pub trait FeedbackManagement {
    /// Stores the feedback record. Commits independently of the aggregate update that follows it; a later
    /// aggregate failure leaves this record in place.
    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, RatingApiError>;

    /// Folds one rating into the running averages of both the service entry and its owning provider, as one atomic
    /// unit.
    ///
    /// The two aggregates are read and rewritten under optimistic count checks so that concurrent submissions
    /// against the same service or provider cannot silently drop an increment. A service without an owning
    /// provider is a consistency failure, never a silent skip.
    async fn apply_rating(&self, service_id: i64, rating: i32) -> Result<(), RatingApiError>;

    async fn fetch_feedback_for_service(&self, service_id: i64) -> Result<Vec<Feedback>, RatingApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum RatingApiError {
    #[error("Invalid feedback. {0}")]
    ValidationError(String),
    #[error("The requested service {0} does not exist")]
    ServiceNotFound(i64),
    #[error("Rating aggregates are inconsistent. {0}")]
    Consistency(String),
    #[error("Rating aggregates for service {0} were modified concurrently and the update could not be applied")]
    UpdateConflict(i64),
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for RatingApiError {
    fn from(e: sqlx::Error) -> Self {
        RatingApiError::DatabaseError(e.to_string())
    }
}

impl From<CatalogApiError> for RatingApiError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::ValidationError(s) => RatingApiError::ValidationError(s),
            CatalogApiError::NotFound(s) => RatingApiError::ValidationError(s),
            CatalogApiError::DatabaseError(s) => RatingApiError::DatabaseError(s),
        }
    }
}
