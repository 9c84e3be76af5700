use std::fmt::Debug;

use crate::{
    db_types::{NewProvider, NewServiceCatalogEntry, NewUser, Provider, ServiceCatalogEntry, User},
    traits::{CatalogApiError, CatalogManagement},
};

/// `CatalogApi` provides the keyed entity storage the core flows validate against. Plumbing only.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn create_user(&self, user: NewUser) -> Result<User, CatalogApiError> {
        if user.email.trim().is_empty() {
            return Err(CatalogApiError::ValidationError("Email is required".to_string()));
        }
        self.db.insert_user(user).await
    }

    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, CatalogApiError> {
        self.db.fetch_user(user_id).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<bool, CatalogApiError> {
        self.db.delete_user(user_id).await
    }

    pub async fn create_provider(&self, provider: NewProvider) -> Result<Provider, CatalogApiError> {
        if provider.email.trim().is_empty() {
            return Err(CatalogApiError::ValidationError("Email is required".to_string()));
        }
        self.db.insert_provider(provider).await
    }

    pub async fn provider_by_id(&self, provider_id: i64) -> Result<Option<Provider>, CatalogApiError> {
        self.db.fetch_provider(provider_id).await
    }

    pub async fn delete_provider(&self, provider_id: i64) -> Result<bool, CatalogApiError> {
        self.db.delete_provider(provider_id).await
    }

    /// A catalog entry can only be created against an existing provider.
    pub async fn create_service(&self, entry: NewServiceCatalogEntry) -> Result<ServiceCatalogEntry, CatalogApiError> {
        self.db
            .fetch_provider(entry.provider_id)
            .await?
            .ok_or_else(|| CatalogApiError::ValidationError("Provider from payload not found".to_string()))?;
        self.db.insert_service(entry).await
    }

    pub async fn service_by_id(&self, service_id: i64) -> Result<Option<ServiceCatalogEntry>, CatalogApiError> {
        self.db.fetch_service(service_id).await
    }

    pub async fn delete_service(&self, service_id: i64) -> Result<bool, CatalogApiError> {
        self.db.delete_service(service_id).await
    }
}
