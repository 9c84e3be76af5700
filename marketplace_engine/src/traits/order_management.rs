use thiserror::Error;

use crate::{
    db_types::{LineItem, NewOrder, Order, OrderId, OrderStatus},
    traits::{CatalogApiError, PaymentGatewayApiError},
};

/// Order persistence operations a backend must provide.
///
/// Every mutation is atomic with respect to other operations on the same order: the backend serializes concurrent
/// read-modify-write cycles on a single order id, while operations on different orders proceed independently.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order, together with its line items, in a single atomic transaction.
    ///
    /// The caller supplies the public order id; referential validation against users and providers has already
    /// happened at the API level, with foreign keys as the backstop.
    async fn insert_order(&self, order: NewOrder, order_id: OrderId) -> Result<Order, OrderFlowError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderFlowError>;

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderFlowError>;

    async fn fetch_orders_for_provider(&self, provider_id: i64) -> Result<Vec<Order>, OrderFlowError>;

    async fn fetch_line_items(&self, order: &Order) -> Result<Vec<LineItem>, OrderFlowError>;

    /// Stores the payment processor's intent id against the order. The order status is left untouched; the stored
    /// id is what makes retried payment initiations reuse the pending intent instead of opening a second one.
    async fn set_payment_intent(&self, order_id: &OrderId, intent_id: &str) -> Result<Order, OrderFlowError>;

    /// Transitions the order to `Paid` and stamps the payment timestamp.
    async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Order, OrderFlowError>;

    /// Overwrites the order status unconditionally. This is the administrative escape hatch; it does not consult
    /// the guarded transition rules that the payment flow enforces.
    async fn set_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, OrderFlowError>;

    /// Deletes the order and its line items. Returns `true` if an order was deleted.
    async fn delete_order(&self, order_id: &OrderId) -> Result<bool, OrderFlowError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid order request. {0}")]
    ValidationError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The requested user {0} does not exist")]
    UserNotFound(i64),
    #[error("The requested provider {0} does not exist")]
    ProviderNotFound(i64),
    #[error("Cannot initiate payment for order {0} while its status is {1}")]
    InvalidState(OrderId, OrderStatus),
    #[error("Payment not successful. Status: {0}")]
    PaymentNotSuccessful(String),
    #[error("Payment gateway failure. {0}")]
    GatewayError(#[from] PaymentGatewayApiError),
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

impl From<CatalogApiError> for OrderFlowError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::ValidationError(s) => OrderFlowError::ValidationError(s),
            CatalogApiError::NotFound(s) => OrderFlowError::ValidationError(s),
            CatalogApiError::DatabaseError(s) => OrderFlowError::DatabaseError(s),
        }
    }
}
