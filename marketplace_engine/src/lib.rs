//! Marketplace Engine
//!
//! The marketplace engine carries the core logic of the service marketplace: the order lifecycle with its payment
//! reconciliation state machine, and the feedback-driven rating aggregation. It is HTTP-framework agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public APIs instead. The exception is the data types used in the
//!    database, defined in the public [`db_types`] module.
//! 2. The engine public API ([`OrderFlowApi`], [`RatingApi`], [`CatalogApi`]). These are generic over the backend
//!    traits in [`traits`], which is also where the contract with the external payment processor
//!    ([`traits::PaymentGateway`]) lives. Concrete backends implement those traits to drive the engine.
pub mod db_types;
pub mod helpers;
mod smp_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use smp_api::{
    catalog_api::CatalogApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    rating_api::RatingApi,
};
