use std::fmt::Debug;

use log::*;
use smp_common::{MAX_RATING, MIN_RATING};

use crate::{
    db_types::{Feedback, NewFeedback},
    traits::{CatalogManagement, FeedbackManagement, RatingApiError},
};

/// `RatingApi` accepts feedback submissions and keeps the running averages of the target service and its owning
/// provider in step with them.
pub struct RatingApi<B> {
    db: B,
}

impl<B> Debug for RatingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RatingApi")
    }
}

impl<B> RatingApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> RatingApi<B>
where B: FeedbackManagement + CatalogManagement
{
    /// Record one piece of feedback and fold its rating into both aggregates.
    ///
    /// The rating must lie within [1, 5] and the requester and target service must both resolve; otherwise nothing
    /// is persisted. Once those checks pass the feedback record itself is stored unconditionally. The aggregate
    /// update runs afterwards as its own atomic unit: if it fails, the stored feedback is kept, the error is
    /// surfaced to the caller, and the discrepancy is logged for reconciliation.
    pub async fn record_feedback(&self, feedback: NewFeedback) -> Result<Feedback, RatingApiError> {
        if !(MIN_RATING..=MAX_RATING).contains(&feedback.rating) {
            return Err(RatingApiError::ValidationError(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        self.db
            .fetch_user(feedback.user_id)
            .await?
            .ok_or_else(|| RatingApiError::ValidationError("User from payload not found".to_string()))?;
        self.db
            .fetch_service(feedback.service_id)
            .await?
            .ok_or_else(|| RatingApiError::ValidationError("Service catalog entry not found".to_string()))?;

        let saved = self.db.insert_feedback(feedback).await?;
        if let Err(e) = self.db.apply_rating(saved.service_id, saved.rating).await {
            error!(
                "📊️ Feedback #{} was stored but the aggregates for service {} were not updated. The averages are \
                 stale until reconciled. {e}",
                saved.id, saved.service_id
            );
            return Err(e);
        }
        debug!("📊️ Feedback #{} recorded against service {}", saved.id, saved.service_id);
        Ok(saved)
    }

    /// All feedback left against the given service, in no particular order.
    pub async fn feedback_for_service(&self, service_id: i64) -> Result<Vec<Feedback>, RatingApiError> {
        self.db.fetch_service(service_id).await?.ok_or(RatingApiError::ServiceNotFound(service_id))?;
        self.db.fetch_feedback_for_service(service_id).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
