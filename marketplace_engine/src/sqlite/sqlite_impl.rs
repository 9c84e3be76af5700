//! `SqliteDatabase` is a concrete implementation of a marketplace engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module. Multi-statement operations run inside a pool transaction, which is also what serializes concurrent
//! read-modify-write cycles against the same row.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{catalog, feedback, new_pool, orders};
use crate::{
    db_types::{
        Feedback,
        LineItem,
        NewFeedback,
        NewOrder,
        NewProvider,
        NewServiceCatalogEntry,
        NewUser,
        Order,
        OrderId,
        OrderStatus,
        Provider,
        ServiceCatalogEntry,
        User,
    },
    traits::{CatalogApiError, CatalogManagement, FeedbackManagement, OrderFlowError, OrderManagement, RatingApiError},
};

/// How often an optimistic aggregate update is retried from a fresh read before giving up.
const MAX_AGGREGATE_UPDATE_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool with the given URL and returns a new instance of `SqliteDatabase`.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Run once at startup, before the first request is served.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder, order_id: OrderId) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let inserted = orders::insert_order(&order, &order_id, &mut tx).await?;
        orders::insert_line_items(inserted.id, &order.line_items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] has been saved in the DB with id {}", inserted.order_id, inserted.id);
        Ok(inserted)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_all_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_provider(&self, provider_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_provider(provider_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_line_items(&self, order: &Order) -> Result<Vec<LineItem>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_line_items_for_order(order.id, &mut conn).await?;
        Ok(items)
    }

    async fn set_payment_intent(&self, order_id: &OrderId, intent_id: &str) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::set_payment_intent(order_id, intent_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Payment intent [{intent_id}] recorded against order [{}]", order.order_id);
        Ok(order)
    }

    async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::mark_order_paid(order_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] marked as paid at {:?}", order.order_id, order.payment_date);
        Ok(order)
    }

    async fn set_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_status(order_id, status, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{}] status overwritten to {status}", order.order_id);
        Ok(order)
    }

    async fn delete_order(&self, order_id: &OrderId) -> Result<bool, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = orders::delete_order(order_id, &mut conn).await?;
        Ok(deleted)
    }
}

impl FeedbackManagement for SqliteDatabase {
    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, RatingApiError> {
        let mut conn = self.pool.acquire().await?;
        feedback::insert_feedback(&feedback, &mut conn).await
    }

    async fn apply_rating(&self, service_id: i64, rating: i32) -> Result<(), RatingApiError> {
        for attempt in 1..=MAX_AGGREGATE_UPDATE_ATTEMPTS {
            let mut conn = self.pool.acquire().await?;
            // An immediate transaction takes the write lock up front. A deferred one would read both aggregates
            // first and can then deadlock against another writer at upgrade time.
            sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
            match feedback::apply_rating(service_id, rating, &mut conn).await {
                Ok(()) => {
                    sqlx::query("COMMIT").execute(&mut *conn).await?;
                    return Ok(());
                },
                Err(RatingApiError::UpdateConflict(_)) => {
                    let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                    debug!(
                        "🗃️ Aggregate update for service {service_id} hit a concurrent writer (attempt \
                         {attempt}/{MAX_AGGREGATE_UPDATE_ATTEMPTS})"
                    );
                },
                Err(e) => {
                    let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                    return Err(e);
                },
            }
        }
        Err(RatingApiError::UpdateConflict(service_id))
    }

    async fn fetch_feedback_for_service(&self, service_id: i64) -> Result<Vec<Feedback>, RatingApiError> {
        let mut conn = self.pool.acquire().await?;
        let feedback = feedback::fetch_feedback_for_service(service_id, &mut conn).await?;
        Ok(feedback)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn insert_user(&self, user: NewUser) -> Result<User, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::insert_user(&user, &mut conn).await
    }

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = catalog::fetch_user(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::delete_user(user_id, &mut conn).await
    }

    async fn insert_provider(&self, provider: NewProvider) -> Result<Provider, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::insert_provider(&provider, &mut conn).await
    }

    async fn fetch_provider(&self, provider_id: i64) -> Result<Option<Provider>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let provider = catalog::fetch_provider(provider_id, &mut conn).await?;
        Ok(provider)
    }

    async fn delete_provider(&self, provider_id: i64) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::delete_provider(provider_id, &mut conn).await
    }

    async fn insert_service(&self, entry: NewServiceCatalogEntry) -> Result<ServiceCatalogEntry, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::insert_service(&entry, &mut conn).await
    }

    async fn fetch_service(&self, service_id: i64) -> Result<Option<ServiceCatalogEntry>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let entry = catalog::fetch_service(service_id, &mut conn).await?;
        Ok(entry)
    }

    async fn delete_service(&self, service_id: i64) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        catalog::delete_service(service_id, &mut conn).await
    }
}
