use async_trait::async_trait;
use sea_orm::{
    sea_query::LikeExpr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use super::{ProductStore, StoreError};
use crate::db::{self, DbConfig};
use crate::entities::product::{
    ActiveModel as ProductActiveModel, Column, Entity as ProductEntity, Model as Product,
};
use crate::errors::ServiceError;
use crate::models::{normalize_barcode, ProductChanges, ProductQuery, ProductRecord};

/// Rows per INSERT statement; keeps SQLite under its bound-parameter limit
const BULK_INSERT_CHUNK: usize = 500;

const LIKE_ESCAPE: char = '\\';

/// `LIKE` pattern matching `fragment` literally anywhere in the column
fn contains_pattern(fragment: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

/// SeaORM-backed product store
#[derive(Debug, Clone)]
pub struct SeaOrmProductStore {
    db: DatabaseConnection,
}

impl SeaOrmProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a connection pool for the store
    pub async fn connect(config: &DbConfig) -> Result<Self, ServiceError> {
        let db = db::establish_connection_with_config(config).await?;
        Ok(Self::new(db))
    }

    /// Brings the schema up to date
    pub async fn migrate(&self) -> Result<(), ServiceError> {
        db::run_migrations(&self.db).await
    }

    async fn find_model(&self, barcode: &str) -> Result<Option<Product>, StoreError> {
        Ok(ProductEntity::find()
            .filter(Column::Barcode.eq(normalize_barcode(barcode)))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl ProductStore for SeaOrmProductStore {
    #[instrument(skip(self, record), fields(barcode = %record.barcode))]
    async fn create(&self, record: ProductRecord) -> Result<Product, StoreError> {
        let product = ProductActiveModel::from(record).insert(&self.db).await?;
        debug!(id = %product.id, "product created");
        Ok(product)
    }

    async fn find_one(&self, barcode: &str) -> Result<Option<Product>, StoreError> {
        self.find_model(barcode).await
    }

    async fn find_many(&self, query: ProductQuery) -> Result<Vec<Product>, StoreError> {
        let mut select = ProductEntity::find();
        if let Some(fragment) = query.barcode_contains.as_deref() {
            let fragment = normalize_barcode(fragment);
            if !fragment.is_empty() {
                select = select.filter(Column::Barcode.like(contains_pattern(&fragment)));
            }
        }
        select = select.order_by_asc(Column::CreatedAt).order_by_asc(Column::Barcode);
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }
        Ok(select.all(&self.db).await?)
    }

    #[instrument(skip(self, changes))]
    async fn update_one(
        &self,
        barcode: &str,
        changes: ProductChanges,
    ) -> Result<Option<Product>, StoreError> {
        let Some(existing) = self.find_model(barcode).await? else {
            return Ok(None);
        };

        let mut active_model = existing.into_active_model();
        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(quantity) = changes.quantity {
            active_model.quantity = Set(quantity);
        }
        if let Some(warehouse) = changes.warehouse {
            active_model.warehouse = Set(warehouse);
        }
        if let Some(container_code) = changes.container_code {
            active_model.container_code = Set(container_code);
        }

        Ok(Some(active_model.update(&self.db).await?))
    }

    #[instrument(skip(self))]
    async fn delete_one(&self, barcode: &str) -> Result<Option<Product>, StoreError> {
        let Some(existing) = self.find_model(barcode).await? else {
            return Ok(None);
        };
        ProductEntity::delete_by_id(existing.id)
            .exec(&self.db)
            .await?;
        Ok(Some(existing))
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = ProductEntity::delete_many().exec(&self.db).await?;
        info!(deleted = result.rows_affected, "all products deleted");
        Ok(result.rows_affected)
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn bulk_insert(&self, records: Vec<ProductRecord>) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        let total = records.len() as u64;

        let txn = self.db.begin().await?;
        let mut pending = records.into_iter().map(ProductActiveModel::from).peekable();
        while pending.peek().is_some() {
            let chunk: Vec<ProductActiveModel> = pending.by_ref().take(BULK_INSERT_CHUNK).collect();
            ProductEntity::insert_many(chunk).exec(&txn).await?;
        }
        txn.commit().await?;

        Ok(total)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        db::check_connection(&self.db)
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }

    async fn close(&self) -> Result<(), StoreError> {
        info!("Closing database connection pool");
        Ok(self.db.clone().close().await?)
    }
}
