mod support;

use marketplace_engine::{
    db_types::{NewLineItem, NewOrder, OrderStatus},
    helpers::new_order_id,
    traits::{OrderFlowError, PaymentGatewayApiError},
    OrderFlowApi,
    SqliteDatabase,
};
use smp_common::{Paise, Rupees};
use support::{new_test_db, seed_provider, seed_user, FakeGateway};

async fn new_api() -> (OrderFlowApi<SqliteDatabase, FakeGateway>, SqliteDatabase, FakeGateway, i64, i64) {
    let db = new_test_db().await;
    let user = seed_user(&db).await;
    let provider = seed_provider(&db).await;
    let gateway = FakeGateway::new();
    let api = OrderFlowApi::new(db.clone(), gateway.clone());
    (api, db, gateway, user.id, provider.id)
}

#[tokio::test]
async fn create_order_rejects_unknown_user() {
    let (api, _db, _gw, _user, provider) = new_api().await;
    let err = api.create_order(NewOrder::new(999, provider, Rupees::from(100))).await.unwrap_err();
    assert!(matches!(&err, OrderFlowError::ValidationError(_)), "unexpected error: {err}");
    // Nothing may be persisted after a failed validation.
    assert!(api.all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_order_rejects_unknown_provider() {
    let (api, _db, _gw, user, _provider) = new_api().await;
    let err = api.create_order(NewOrder::new(user, 999, Rupees::from(100))).await.unwrap_err();
    assert!(matches!(&err, OrderFlowError::ValidationError(_)), "unexpected error: {err}");
    assert!(api.all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_order_rejects_non_positive_cost() {
    let (api, _db, _gw, user, provider) = new_api().await;
    let err = api.create_order(NewOrder::new(user, provider, Rupees::from(0))).await.unwrap_err();
    assert!(matches!(&err, OrderFlowError::ValidationError(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn create_order_starts_in_requested_state_with_line_items() {
    let (api, _db, _gw, user, provider) = new_api().await;
    let order = NewOrder::new(user, provider, "1498.00".parse().unwrap())
        .with_line_item(NewLineItem::new("Tap installation", Rupees::from(499)))
        .with_line_item(NewLineItem::new("Geyser repair", Rupees::from(999)));
    let result = api.create_order(order).await.unwrap();
    assert_eq!(result.order.status, OrderStatus::Requested);
    assert!(result.order.payment_intent_id.is_none());
    assert_eq!(result.line_items.len(), 2);
    let fetched = api.fetch_order(&result.order.order_id).await.unwrap().unwrap();
    assert_eq!(fetched.order.id, result.order.id);
    assert_eq!(fetched.line_items.len(), 2);
}

#[tokio::test]
async fn initiate_payment_fails_for_unknown_order() {
    let (api, _db, _gw, _user, _provider) = new_api().await;
    let err = api.initiate_payment(&new_order_id()).await.unwrap_err();
    assert!(matches!(&err, OrderFlowError::OrderNotFound(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn initiate_payment_is_rejected_once_settled_or_terminal() {
    let (api, _db, _gw, user, provider) = new_api().await;
    for status in [OrderStatus::Paid, OrderStatus::Completed, OrderStatus::Cancelled] {
        let created = api.create_order(NewOrder::new(user, provider, Rupees::from(100))).await.unwrap();
        api.update_order_status(&created.order.order_id, status).await.unwrap();
        let err = api.initiate_payment(&created.order.order_id).await.unwrap_err();
        assert!(matches!(&err, OrderFlowError::InvalidState(_, s) if *s == status), "unexpected error: {err}");
    }
}

#[tokio::test]
async fn initiate_payment_charges_whole_paise() {
    let (api, _db, _gw, user, provider) = new_api().await;
    // 19.995 rounds to 20.00 rupees before scaling, so the gateway sees 2000 paise, not 1999.
    let created = api.create_order(NewOrder::new(user, provider, "19.995".parse().unwrap())).await.unwrap();
    let init = api.initiate_payment(&created.order.order_id).await.unwrap();
    assert_eq!(init.amount_in_paise, Paise::from(2000));
    assert_eq!(init.amount_in_rupees, Rupees::from(20));
    assert_eq!(init.currency, "INR");
    assert!(!init.client_secret.reveal().is_empty());
}

#[tokio::test]
async fn initiate_payment_stores_the_intent_id() {
    let (api, _db, _gw, user, provider) = new_api().await;
    let created = api.create_order(NewOrder::new(user, provider, Rupees::from(250))).await.unwrap();
    api.initiate_payment(&created.order.order_id).await.unwrap();
    let fetched = api.fetch_order(&created.order.order_id).await.unwrap().unwrap();
    assert!(fetched.order.payment_intent_id.is_some());
    // The status is untouched by initiation; only confirmation moves it.
    assert_eq!(fetched.order.status, OrderStatus::Requested);
}

#[tokio::test]
async fn initiate_payment_reuses_a_pending_intent() {
    let (api, _db, gateway, user, provider) = new_api().await;
    let created = api.create_order(NewOrder::new(user, provider, Rupees::from(250))).await.unwrap();
    let first = api.initiate_payment(&created.order.order_id).await.unwrap();
    let second = api.initiate_payment(&created.order.order_id).await.unwrap();
    assert_eq!(gateway.create_calls(), 1, "a second intent must not be opened while the first is pending");
    assert_eq!(first.client_secret.reveal(), second.client_secret.reveal());
}

#[tokio::test]
async fn initiate_payment_replaces_a_dead_intent() {
    let (api, _db, gateway, user, provider) = new_api().await;
    let created = api.create_order(NewOrder::new(user, provider, Rupees::from(250))).await.unwrap();
    api.initiate_payment(&created.order.order_id).await.unwrap();
    gateway.report_status("canceled");
    api.initiate_payment(&created.order.order_id).await.unwrap();
    assert_eq!(gateway.create_calls(), 2);
}

#[tokio::test]
async fn confirm_payment_marks_the_order_paid() {
    let (api, _db, gateway, user, provider) = new_api().await;
    let created = api.create_order(NewOrder::new(user, provider, Rupees::from(250))).await.unwrap();
    api.initiate_payment(&created.order.order_id).await.unwrap();
    gateway.report_status("succeeded");
    let intent_id = api.fetch_order(&created.order.order_id).await.unwrap().unwrap().order.payment_intent_id.unwrap();
    let updated = api.confirm_payment(&created.order.order_id, &intent_id).await.unwrap();
    assert_eq!(updated.status, OrderStatus::Paid);
    assert!(updated.payment_date.is_some());
}

#[tokio::test]
async fn confirm_payment_reports_a_non_success_status_without_mutating() {
    let (api, _db, gateway, user, provider) = new_api().await;
    let created = api.create_order(NewOrder::new(user, provider, Rupees::from(250))).await.unwrap();
    api.initiate_payment(&created.order.order_id).await.unwrap();
    gateway.report_status("processing");
    let intent_id = api.fetch_order(&created.order.order_id).await.unwrap().unwrap().order.payment_intent_id.unwrap();
    let err = api.confirm_payment(&created.order.order_id, &intent_id).await.unwrap_err();
    assert!(matches!(&err, OrderFlowError::PaymentNotSuccessful(s) if s == "processing"), "unexpected error: {err}");
    let fetched = api.fetch_order(&created.order.order_id).await.unwrap().unwrap();
    assert_eq!(fetched.order.status, OrderStatus::Requested);
    assert!(fetched.order.payment_date.is_none());
}

#[tokio::test]
async fn confirm_payment_surfaces_gateway_failures_without_mutating() {
    let (api, _db, gateway, user, provider) = new_api().await;
    let created = api.create_order(NewOrder::new(user, provider, Rupees::from(250))).await.unwrap();
    api.initiate_payment(&created.order.order_id).await.unwrap();
    let intent_id = api.fetch_order(&created.order.order_id).await.unwrap().unwrap().order.payment_intent_id.unwrap();
    gateway.fail_with(PaymentGatewayApiError::Timeout("deadline exceeded".to_string()));
    let err = api.confirm_payment(&created.order.order_id, &intent_id).await.unwrap_err();
    assert!(matches!(&err, OrderFlowError::GatewayError(_)), "unexpected error: {err}");
    let fetched = api.fetch_order(&created.order.order_id).await.unwrap().unwrap();
    assert_eq!(fetched.order.status, OrderStatus::Requested);
}

#[tokio::test]
async fn status_override_ignores_the_guarded_graph() {
    let (api, _db, gateway, user, provider) = new_api().await;
    let created = api.create_order(NewOrder::new(user, provider, Rupees::from(250))).await.unwrap();
    api.initiate_payment(&created.order.order_id).await.unwrap();
    gateway.report_status("succeeded");
    let intent_id = api.fetch_order(&created.order.order_id).await.unwrap().unwrap().order.payment_intent_id.unwrap();
    api.confirm_payment(&created.order.order_id, &intent_id).await.unwrap();
    // The administrative override may move a paid order back to Requested.
    let updated = api.update_order_status(&created.order.order_id, OrderStatus::Requested).await.unwrap();
    assert_eq!(updated.status, OrderStatus::Requested);
}

#[tokio::test]
async fn orders_can_be_listed_per_user_and_provider() {
    let (api, db, _gw, user, provider) = new_api().await;
    let other_user = support::seed_user(&db).await;
    api.create_order(NewOrder::new(user, provider, Rupees::from(100))).await.unwrap();
    api.create_order(NewOrder::new(user, provider, Rupees::from(200))).await.unwrap();
    api.create_order(NewOrder::new(other_user.id, provider, Rupees::from(300))).await.unwrap();

    assert_eq!(api.orders_for_user(user).await.unwrap().len(), 2);
    assert_eq!(api.orders_for_user(other_user.id).await.unwrap().len(), 1);
    assert_eq!(api.orders_for_provider(provider).await.unwrap().len(), 3);
    let err = api.orders_for_user(404_404).await.unwrap_err();
    assert!(matches!(&err, OrderFlowError::UserNotFound(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn delete_order_reports_whether_anything_was_removed() {
    let (api, _db, _gw, user, provider) = new_api().await;
    let created = api.create_order(NewOrder::new(user, provider, Rupees::from(100))).await.unwrap();
    assert!(api.delete_order(&created.order.order_id).await.unwrap());
    assert!(!api.delete_order(&created.order.order_id).await.unwrap());
    assert!(api.fetch_order(&created.order.order_id).await.unwrap().is_none());
}
