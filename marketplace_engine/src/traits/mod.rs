//! Behaviour that storage backends and external collaborators must provide for the marketplace engine.
//!
//! The engine's public APIs ([`crate::OrderFlowApi`], [`crate::RatingApi`], [`crate::CatalogApi`]) are generic over
//! these traits. The SQLite backend implements the three management traits; the payment processor adapter lives in
//! the server crate and implements [`PaymentGateway`].

mod catalog_management;
mod feedback_management;
mod order_management;
mod payment_gateway;

pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use feedback_management::{FeedbackManagement, RatingApiError};
pub use order_management::{OrderFlowError, OrderManagement};
pub use payment_gateway::{
    intent_is_pending,
    PaymentGateway,
    PaymentGatewayApiError,
    PaymentIntent,
    INTENT_STATUS_SUCCEEDED,
};
