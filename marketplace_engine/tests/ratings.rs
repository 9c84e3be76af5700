mod support;

use futures_util::future::join_all;
use marketplace_engine::{
    db_types::NewFeedback,
    traits::RatingApiError,
    CatalogApi,
    RatingApi,
    SqliteDatabase,
};
use rust_decimal_macros::dec;
use support::{new_test_db, seed_provider, seed_service, seed_user};

async fn new_api() -> (RatingApi<SqliteDatabase>, SqliteDatabase, i64, i64, i64) {
    let db = new_test_db().await;
    let user = seed_user(&db).await;
    let provider = seed_provider(&db).await;
    let service = seed_service(&db, provider.id).await;
    (RatingApi::new(db.clone()), db, user.id, provider.id, service.id)
}

async fn aggregates(db: &SqliteDatabase, provider_id: i64, service_id: i64) -> (rust_decimal::Decimal, i64, rust_decimal::Decimal, i64) {
    let catalog = CatalogApi::new(db.clone());
    let service = catalog.service_by_id(service_id).await.unwrap().unwrap();
    let provider = catalog.provider_by_id(provider_id).await.unwrap().unwrap();
    (service.avg_rating.value(), service.total_ratings, provider.avg_rating.value(), provider.total_ratings)
}

#[tokio::test]
async fn out_of_range_ratings_are_rejected_and_persist_nothing() {
    let (api, db, user, provider, service) = new_api().await;
    for rating in [0, 6, -3, 42] {
        let err = api.record_feedback(NewFeedback::new(user, service, rating)).await.unwrap_err();
        assert!(matches!(&err, RatingApiError::ValidationError(_)), "unexpected error: {err}");
    }
    assert!(api.feedback_for_service(service).await.unwrap().is_empty());
    let (s_avg, s_count, p_avg, p_count) = aggregates(&db, provider, service).await;
    assert_eq!((s_avg, s_count, p_avg, p_count), (dec!(0), 0, dec!(0), 0));
}

#[tokio::test]
async fn feedback_requires_a_known_user_and_service() {
    let (api, _db, user, _provider, service) = new_api().await;
    let err = api.record_feedback(NewFeedback::new(404_404, service, 4)).await.unwrap_err();
    assert!(matches!(&err, RatingApiError::ValidationError(_)), "unexpected error: {err}");
    let err = api.record_feedback(NewFeedback::new(user, 404_404, 4)).await.unwrap_err();
    assert!(matches!(&err, RatingApiError::ValidationError(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn a_sequence_of_ratings_updates_both_aggregates() {
    let (api, db, user, provider, service) = new_api().await;
    for rating in [5, 3, 4] {
        api.record_feedback(NewFeedback::new(user, service, rating)).await.unwrap();
    }
    let (s_avg, s_count, p_avg, p_count) = aggregates(&db, provider, service).await;
    assert_eq!(s_avg, dec!(4.0));
    assert_eq!(s_count, 3);
    assert_eq!(p_avg, dec!(4.0));
    assert_eq!(p_count, 3);
}

#[tokio::test]
async fn averages_round_half_up_at_one_decimal() {
    let (api, db, user, provider, service) = new_api().await;
    // After three 1s the average sits at 1.0; folding in a 2 gives 1.25, which rounds up to 1.3.
    for rating in [1, 1, 1, 2] {
        api.record_feedback(NewFeedback::new(user, service, rating)).await.unwrap();
    }
    let (s_avg, s_count, _p_avg, _p_count) = aggregates(&db, provider, service).await;
    assert_eq!(s_avg, dec!(1.3));
    assert_eq!(s_count, 4);
}

#[tokio::test]
async fn provider_aggregates_span_all_of_its_services() {
    let (api, db, user, provider, service) = new_api().await;
    let second_service = seed_service(&db, provider).await;
    api.record_feedback(NewFeedback::new(user, service, 5)).await.unwrap();
    api.record_feedback(NewFeedback::new(user, second_service.id, 2)).await.unwrap();

    let catalog = CatalogApi::new(db.clone());
    let first = catalog.service_by_id(service).await.unwrap().unwrap();
    let second = catalog.service_by_id(second_service.id).await.unwrap().unwrap();
    let owner = catalog.provider_by_id(provider).await.unwrap().unwrap();
    assert_eq!((first.avg_rating.value(), first.total_ratings), (dec!(5.0), 1));
    assert_eq!((second.avg_rating.value(), second.total_ratings), (dec!(2.0), 1));
    assert_eq!((owner.avg_rating.value(), owner.total_ratings), (dec!(3.5), 2));
}

#[tokio::test]
async fn concurrent_submissions_do_not_lose_updates() {
    let (api, db, user, provider, service) = new_api().await;
    const SUBMISSIONS: usize = 16;
    let api = std::sync::Arc::new(api);
    let tasks = (0..SUBMISSIONS).map(|_| {
        let api = api.clone();
        tokio::spawn(async move { api.record_feedback(NewFeedback::new(user, service, 4)).await })
    });
    for result in join_all(tasks).await {
        result.expect("task panicked").expect("feedback submission failed");
    }
    let (s_avg, s_count, p_avg, p_count) = aggregates(&db, provider, service).await;
    assert_eq!(s_count, SUBMISSIONS as i64, "an increment was lost");
    assert_eq!(p_count, SUBMISSIONS as i64, "an increment was lost");
    assert_eq!(s_avg, dec!(4.0));
    assert_eq!(p_avg, dec!(4.0));
}

#[tokio::test]
async fn feedback_listing_requires_a_known_service() {
    let (api, _db, user, _provider, service) = new_api().await;
    api.record_feedback(NewFeedback::new(user, service, 4)).await.unwrap();
    api.record_feedback(NewFeedback::new(user, service, 5)).await.unwrap();
    let listed = api.feedback_for_service(service).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|f| f.service_id == service));

    let err = api.feedback_for_service(404_404).await.unwrap_err();
    assert!(matches!(&err, RatingApiError::ServiceNotFound(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn aggregate_failure_keeps_the_feedback_record() {
    let (api, db, user, provider, service) = new_api().await;
    // Point the service at a provider row that does not exist. The feedback row must survive the resulting
    // consistency failure. The foreign key check is disabled on this one connection to let the corruption in.
    let mut conn = db.pool().acquire().await.unwrap();
    sqlx::query("PRAGMA foreign_keys = OFF").execute(&mut *conn).await.unwrap();
    sqlx::query("UPDATE services SET provider_id = 404404 WHERE id = $1")
        .bind(service)
        .execute(&mut *conn)
        .await
        .unwrap();
    drop(conn);
    let err = api.record_feedback(NewFeedback::new(user, service, 4)).await.unwrap_err();
    assert!(matches!(&err, RatingApiError::Consistency(_)), "unexpected error: {err}");
    let listed = api.feedback_for_service(service).await.unwrap();
    assert_eq!(listed.len(), 1, "the feedback record must be kept when the aggregate update fails");
    let (_s_avg, s_count, _p_avg, p_count) = aggregates(&db, provider, service).await;
    assert_eq!(s_count, 0);
    assert_eq!(p_count, 0);
}
