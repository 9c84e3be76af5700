use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use marketplace_engine::{
    db_types::{Order, OrderId, OrderStatus},
    traits::{PaymentGatewayApiError, PaymentIntent},
    OrderFlowApi,
};
use rust_decimal_macros::dec;
use smp_common::{Rupees, Secret};

use crate::{
    endpoint_tests::{
        helpers::{delete_request, get_request, post_request, put_request},
        mocks::{MockBackend, MockGateway},
    },
    routes::configure_api,
};

fn order(status: OrderStatus) -> Order {
    Order {
        id: 1,
        order_id: OrderId("smp-0000000000000001".into()),
        user_id: 1,
        provider_id: 2,
        status,
        total_cost: Rupees::from(dec!(19.995)),
        payment_intent_id: None,
        payment_method: None,
        payment_date: None,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn intent(status: &str) -> PaymentIntent {
    PaymentIntent {
        intent_id: "pi_123".to_string(),
        client_secret: Secret::new("pi_123_secret".to_string()),
        status: status.to_string(),
    }
}

fn configure(backend: MockBackend, gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(backend, gateway);
        cfg.app_data(web::Data::new(api));
        configure_api::<MockBackend, MockGateway>(cfg);
    }
}

#[actix_web::test]
async fn fetching_an_unknown_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    let (status, body) = get_request("/api/orders/smp-missing", configure(backend, MockGateway::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Order #smp-missing not found"), "unexpected body: {body}");
}

#[actix_web::test]
async fn creating_an_order_for_an_unknown_user_is_a_400() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_user().returning(|_| Ok(None));
    let payload = serde_json::json!({ "user_id": 42, "provider_id": 2, "total_cost": "100.00" });
    let (status, body) = post_request("/api/orders", payload, configure(backend, MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("User from payload not found"), "unexpected body: {body}");
}

#[actix_web::test]
async fn payment_cannot_be_initiated_on_a_paid_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order(OrderStatus::Paid))));
    let (status, body) = post_request(
        "/api/orders/smp-0000000000000001/payment/initiate",
        serde_json::json!({}),
        configure(backend, MockGateway::new()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Cannot initiate payment"), "unexpected body: {body}");
}

#[actix_web::test]
async fn a_gateway_failure_during_initiation_is_a_500() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order(OrderStatus::Requested))));
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_intent()
        .returning(|_, _| Err(PaymentGatewayApiError::Transport("connection refused".to_string())));
    let (status, body) = post_request(
        "/api/orders/smp-0000000000000001/payment/initiate",
        serde_json::json!({}),
        configure(backend, gateway),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Payment gateway failure"), "unexpected body: {body}");
}

#[actix_web::test]
async fn initiating_a_payment_returns_the_client_contract() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order(OrderStatus::Requested))));
    backend.expect_set_payment_intent().returning(|_, intent_id| {
        let mut o = order(OrderStatus::Requested);
        o.payment_intent_id = Some(intent_id.to_string());
        Ok(o)
    });
    let mut gateway = MockGateway::new();
    gateway.expect_create_intent().returning(|_, _| Ok(intent("requires_payment_method")));
    let (status, body) = post_request(
        "/api/orders/smp-0000000000000001/payment/initiate",
        serde_json::json!({}),
        configure(backend, gateway),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 19.995 is charged as 20.00 rupees / 2000 paise.
    assert_eq!(
        body,
        r#"{"clientSecret":"pi_123_secret","amountInRupees":"20.00","amountInPaise":2000,"currency":"INR"}"#
    );
}

#[actix_web::test]
async fn confirmation_with_a_non_success_status_is_a_400() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_order_id().returning(|_| {
        let mut o = order(OrderStatus::Requested);
        o.payment_intent_id = Some("pi_123".to_string());
        Ok(Some(o))
    });
    let mut gateway = MockGateway::new();
    gateway.expect_confirm_intent().returning(|_| Ok(intent("processing")));
    let (status, body) = post_request(
        "/api/orders/smp-0000000000000001/payment/confirm",
        serde_json::json!({ "paymentIntentId": "pi_123" }),
        configure(backend, gateway),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Payment not successful. Status: processing"), "unexpected body: {body}");
}

#[actix_web::test]
async fn a_succeeded_intent_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_order_id().returning(|_| {
        let mut o = order(OrderStatus::Requested);
        o.payment_intent_id = Some("pi_123".to_string());
        Ok(Some(o))
    });
    backend.expect_mark_order_paid().returning(|_| {
        let mut o = order(OrderStatus::Paid);
        o.payment_intent_id = Some("pi_123".to_string());
        o.payment_date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        Ok(o)
    });
    let mut gateway = MockGateway::new();
    gateway.expect_confirm_intent().returning(|_| Ok(intent("succeeded")));
    let (status, body) = post_request(
        "/api/orders/smp-0000000000000001/payment/confirm",
        serde_json::json!({ "paymentIntentId": "pi_123" }),
        configure(backend, gateway),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(updated["status"], "Paid");
    assert!(updated["payment_date"].is_string());
}

#[actix_web::test]
async fn the_status_override_reports_the_new_state() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_set_order_status().returning(|_, status| Ok(order(status)));
    let (status, body) = put_request(
        "/api/orders/smp-0000000000000001/status",
        serde_json::json!({ "status": "Cancelled" }),
        configure(backend, MockGateway::new()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(updated["status"], "Cancelled");
}

#[actix_web::test]
async fn deleting_an_unknown_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_delete_order().returning(|_| Ok(false));
    let (status, _body) = delete_request("/api/orders/smp-missing", configure(backend, MockGateway::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_an_order_reports_success() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_delete_order().returning(|_| Ok(true));
    let (status, body) =
        delete_request("/api/orders/smp-0000000000000001", configure(backend, MockGateway::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Order deleted successfully"), "unexpected body: {body}");
}
