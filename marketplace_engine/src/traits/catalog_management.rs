use thiserror::Error;

use crate::db_types::{NewProvider, NewServiceCatalogEntry, NewUser, Provider, ServiceCatalogEntry, User};

/// Keyed storage for the entities the core flows validate against: requesters, providers and catalog entries.
///
/// This is plumbing; there is no algorithmic content here. Search and listing are deliberately absent.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn insert_user(&self, user: NewUser) -> Result<User, CatalogApiError>;
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, CatalogApiError>;
    async fn delete_user(&self, user_id: i64) -> Result<bool, CatalogApiError>;

    async fn insert_provider(&self, provider: NewProvider) -> Result<Provider, CatalogApiError>;
    async fn fetch_provider(&self, provider_id: i64) -> Result<Option<Provider>, CatalogApiError>;
    async fn delete_provider(&self, provider_id: i64) -> Result<bool, CatalogApiError>;

    async fn insert_service(&self, entry: NewServiceCatalogEntry) -> Result<ServiceCatalogEntry, CatalogApiError>;
    async fn fetch_service(&self, service_id: i64) -> Result<Option<ServiceCatalogEntry>, CatalogApiError>;
    async fn delete_service(&self, service_id: i64) -> Result<bool, CatalogApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("The data was not found. {0}")]
    NotFound(String),
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}
