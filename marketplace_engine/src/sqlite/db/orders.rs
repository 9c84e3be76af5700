use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{LineItem, NewLineItem, NewOrder, Order, OrderId, OrderStatus},
    traits::OrderFlowError,
};

/// Inserts a new order row using the given connection. This is not atomic on its own; callers embed it inside a
/// transaction together with [`insert_line_items`] and pass `&mut *tx` as the connection argument.
pub(crate) async fn insert_order(
    order: &NewOrder,
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                user_id,
                provider_id,
                status,
                total_cost,
                payment_method
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(order.user_id)
    .bind(order.provider_id)
    .bind(OrderStatus::Requested.to_string())
    .bind(order.total_cost)
    .bind(order.payment_method.map(|m| m.to_string()))
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub(crate) async fn insert_line_items(
    order_db_id: i64,
    items: &[NewLineItem],
    conn: &mut SqliteConnection,
) -> Result<(), OrderFlowError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO line_items (order_id, service_name, cost, quantity, requested_date, scheduled_date, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7);
        "#,
        )
        .bind(order_db_id)
        .bind(item.service_name.clone())
        .bind(item.cost)
        .bind(item.quantity)
        .bind(item.requested_date)
        .bind(item.scheduled_date)
        .bind(item.image_url.clone())
        .execute(&mut *conn)
        .await?;
    }
    trace!("📝️ {} line items inserted for order id {order_db_id}", items.len());
    Ok(())
}

pub(crate) async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Results are ordered by `created_at` in ascending order.
pub(crate) async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders ORDER BY created_at ASC").fetch_all(conn).await
}

pub(crate) async fn fetch_orders_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

pub(crate) async fn fetch_orders_for_provider(
    provider_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE provider_id = $1 ORDER BY created_at ASC")
        .bind(provider_id)
        .fetch_all(conn)
        .await
}

pub(crate) async fn fetch_line_items_for_order(
    order_db_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<LineItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM line_items WHERE order_id = $1").bind(order_db_id).fetch_all(conn).await
}

/// Stores the payment processor's intent id against the order without touching the status. The stored id is what
/// lets a retried payment initiation reuse the pending intent rather than opening a second one.
pub(crate) async fn set_payment_intent(
    order_id: &OrderId,
    intent_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_intent_id = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(intent_id)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
}

pub(crate) async fn mark_order_paid(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, payment_date = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP WHERE \
         order_id = $2 RETURNING *",
    )
    .bind(OrderStatus::Paid.to_string())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
}

/// Overwrites the order status unconditionally. The guarded transition rules live in the order flow API; this is
/// the administrative override path.
pub(crate) async fn update_order_status(
    order_id: &OrderId,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *")
            .bind(status.to_string())
            .bind(order_id.as_str())
            .fetch_optional(conn)
            .await?;
    result.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
}

/// Deletes the order. Line items follow via the cascading foreign key.
pub(crate) async fn delete_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<bool, OrderFlowError> {
    let result = sqlx::query("DELETE FROM orders WHERE order_id = $1").bind(order_id.as_str()).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
