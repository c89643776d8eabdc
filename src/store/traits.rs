use crate::models::{NewProperty, NewUser, Property, User};
use crate::store::StoreError;
use async_trait::async_trait;

/// Storage of property listings
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Store a listing, assigning it a fresh unique id.
    ///
    /// The record is visible to [`PropertyStore::list_all`] as soon as this returns.
    async fn create_one(&self, listing: NewProperty) -> Result<Property, StoreError>;

    /// Every stored listing, oldest first
    async fn list_all(&self) -> Result<Vec<Property>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, StoreError>;
}

/// Storage of signed-in accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
}
