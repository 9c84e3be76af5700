use log::{trace, warn};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Feedback, NewFeedback, Provider, ServiceCatalogEntry},
    traits::RatingApiError,
};

pub(crate) async fn insert_feedback(
    feedback: &NewFeedback,
    conn: &mut SqliteConnection,
) -> Result<Feedback, RatingApiError> {
    let feedback: Feedback = sqlx::query_as(
        r#"
            INSERT INTO feedback (user_id, service_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(feedback.user_id)
    .bind(feedback.service_id)
    .bind(feedback.rating)
    .bind(feedback.comment.clone())
    .fetch_one(conn)
    .await?;
    trace!("📊️ Feedback #{} stored against service {}", feedback.id, feedback.service_id);
    Ok(feedback)
}

/// Feedback is returned in storage order; callers get no ordering guarantee.
pub(crate) async fn fetch_feedback_for_service(
    service_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM feedback WHERE service_id = $1").bind(service_id).fetch_all(conn).await
}

/// Folds one rating into the running averages of the service entry and its owning provider.
///
/// Both rows are rewritten under an optimistic `total_ratings` check. If either row was modified between the read
/// and the write, the function fails with [`RatingApiError::UpdateConflict`] so the caller can roll back the
/// transaction and retry from a fresh read. A missing owning provider is a consistency failure.
pub(crate) async fn apply_rating(
    service_id: i64,
    rating: i32,
    conn: &mut SqliteConnection,
) -> Result<(), RatingApiError> {
    let service: ServiceCatalogEntry = sqlx::query_as("SELECT * FROM services WHERE id = $1")
        .bind(service_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RatingApiError::ServiceNotFound(service_id))?;
    let provider: Option<Provider> = sqlx::query_as("SELECT * FROM providers WHERE id = $1")
        .bind(service.provider_id)
        .fetch_optional(&mut *conn)
        .await?;
    let provider = provider.ok_or_else(|| {
        RatingApiError::Consistency(format!(
            "Service {service_id} refers to provider {}, which does not exist",
            service.provider_id
        ))
    })?;

    let new_service_avg = service.avg_rating.fold(service.total_ratings, rating);
    let new_provider_avg = provider.avg_rating.fold(provider.total_ratings, rating);

    let updated = sqlx::query(
        "UPDATE services SET avg_rating = $1, total_ratings = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3 AND \
         total_ratings = $4",
    )
    .bind(new_service_avg)
    .bind(service.total_ratings + 1)
    .bind(service.id)
    .bind(service.total_ratings)
    .execute(&mut *conn)
    .await?;
    if updated.rows_affected() == 0 {
        warn!("📊️ Service {service_id} aggregates changed under us. Rolling back for a retry.");
        return Err(RatingApiError::UpdateConflict(service_id));
    }

    let updated = sqlx::query(
        "UPDATE providers SET avg_rating = $1, total_ratings = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3 AND \
         total_ratings = $4",
    )
    .bind(new_provider_avg)
    .bind(provider.total_ratings + 1)
    .bind(provider.id)
    .bind(provider.total_ratings)
    .execute(&mut *conn)
    .await?;
    if updated.rows_affected() == 0 {
        warn!("📊️ Provider {} aggregates changed under us. Rolling back for a retry.", provider.id);
        return Err(RatingApiError::UpdateConflict(service_id));
    }

    trace!(
        "📊️ Rating {rating} applied. Service {service_id} now at {} over {} ratings; provider {} at {} over {}.",
        new_service_avg,
        service.total_ratings + 1,
        provider.id,
        new_provider_avg,
        provider.total_ratings + 1
    );
    Ok(())
}
