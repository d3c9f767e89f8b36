use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};

use crate::entities::product::Model as Product;
use crate::models::{ProductChanges, ProductQuery, ProductRecord};

pub mod in_memory;
pub mod product_repository;

pub use in_memory::InMemoryProductStore;
pub use product_repository::SeaOrmProductStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate barcode: {0}")]
    DuplicateBarcode(String),

    #[error("database error: {0}")]
    Database(DbErr),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::DuplicateBarcode(detail),
            _ => StoreError::Database(err),
        }
    }
}

/// Persistence seam for products.
///
/// Barcodes handed to lookups are matched case-insensitively against the
/// lower-cased stored value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, record: ProductRecord) -> Result<Product, StoreError>;

    async fn find_one(&self, barcode: &str) -> Result<Option<Product>, StoreError>;

    async fn find_many(&self, query: ProductQuery) -> Result<Vec<Product>, StoreError>;

    /// Applies `changes` to the product; `Ok(None)` when no product matches
    async fn update_one(
        &self,
        barcode: &str,
        changes: ProductChanges,
    ) -> Result<Option<Product>, StoreError>;

    async fn delete_one(&self, barcode: &str) -> Result<Option<Product>, StoreError>;

    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Inserts every record or none of them
    async fn bulk_insert(&self, records: Vec<ProductRecord>) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self) -> Result<(), StoreError>;
}
