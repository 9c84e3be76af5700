use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use marketplace_engine::{
    db_types::{Feedback, ServiceCatalogEntry, User},
    traits::RatingApiError,
    RatingApi,
};
use rust_decimal_macros::dec;
use smp_common::{RatingScore, Rupees};

use crate::endpoint_tests::{
    helpers::{get_request, post_request},
    mocks::{MockBackend, MockGateway},
};
use crate::routes::configure_api;

fn user() -> User {
    User {
        id: 1,
        name: "Priya Requester".to_string(),
        email: "priya@example.com".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
    }
}

fn service() -> ServiceCatalogEntry {
    ServiceCatalogEntry {
        id: 7,
        provider_id: 2,
        name: "Tap installation".to_string(),
        description: None,
        cost: Rupees::from(dec!(499)),
        avg_rating: RatingScore::from(dec!(4.5)),
        total_ratings: 2,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
    }
}

fn feedback(rating: i32) -> Feedback {
    Feedback {
        id: 11,
        user_id: 1,
        service_id: 7,
        rating,
        comment: None,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
    }
}

fn configure(backend: MockBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = RatingApi::new(backend);
        cfg.app_data(web::Data::new(api));
        configure_api::<MockBackend, MockGateway>(cfg);
    }
}

#[actix_web::test]
async fn an_out_of_range_rating_is_rejected_before_any_lookup() {
    let _ = env_logger::try_init().ok();
    let backend = MockBackend::new();
    let payload = serde_json::json!({ "user_id": 1, "service_id": 7, "rating": 6 });
    let (status, body) = post_request("/api/feedback", payload, configure(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Rating must be between 1 and 5"), "unexpected body: {body}");
}

#[actix_web::test]
async fn feedback_from_an_unknown_user_is_a_400() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_user().returning(|_| Ok(None));
    let payload = serde_json::json!({ "user_id": 404, "service_id": 7, "rating": 4 });
    let (status, body) = post_request("/api/feedback", payload, configure(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("User from payload not found"), "unexpected body: {body}");
}

#[actix_web::test]
async fn accepted_feedback_is_a_201() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_user().returning(|_| Ok(Some(user())));
    backend.expect_fetch_service().returning(|_| Ok(Some(service())));
    backend.expect_insert_feedback().returning(|f| Ok(feedback(f.rating)));
    backend.expect_apply_rating().returning(|_, _| Ok(()));
    let payload = serde_json::json!({ "user_id": 1, "service_id": 7, "rating": 5 });
    let (status, body) = post_request("/api/feedback", payload, configure(backend)).await;
    assert_eq!(status, StatusCode::CREATED);
    let saved: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(saved["rating"], 5);
    assert_eq!(saved["service_id"], 7);
}

#[actix_web::test]
async fn a_failed_aggregate_update_is_a_500() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_user().returning(|_| Ok(Some(user())));
    backend.expect_fetch_service().returning(|_| Ok(Some(service())));
    backend.expect_insert_feedback().returning(|f| Ok(feedback(f.rating)));
    backend
        .expect_apply_rating()
        .returning(|_, _| Err(RatingApiError::Consistency("Service 7 refers to provider 2, which does not exist".to_string())));
    let payload = serde_json::json!({ "user_id": 1, "service_id": 7, "rating": 5 });
    let (status, _body) = post_request("/api/feedback", payload, configure(backend)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn listing_feedback_for_an_unknown_service_is_a_404() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_service().returning(|_| Ok(None));
    let (status, body) = get_request("/api/feedback/service/404", configure(backend)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Service 404 not found"), "unexpected body: {body}");
}

#[actix_web::test]
async fn listing_feedback_returns_every_record() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_service().returning(|_| Ok(Some(service())));
    backend.expect_fetch_feedback_for_service().returning(|_| Ok(vec![feedback(4), feedback(5)]));
    let (status, body) = get_request("/api/feedback/service/7", configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let listed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);
}
