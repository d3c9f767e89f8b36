use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::entities::product::Model as Product;
use crate::errors::ServiceError;
use crate::models::{normalize_barcode, NewProduct, ProductChanges, ProductQuery};
use crate::repositories::{ProductStore, StoreError};

/// Product CRUD and lookup on top of a [`ProductStore`]
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    search_limit: u64,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>, search_limit: u64) -> Self {
        Self {
            store,
            search_limit,
        }
    }

    /// Creates a product; a barcode that already exists is a conflict
    #[instrument(skip(self, product), fields(barcode = %product.barcode))]
    pub async fn create(&self, product: NewProduct) -> Result<Product, ServiceError> {
        let record = product.into_record()?;
        let barcode = record.barcode.clone();
        match self.store.create(record).await {
            Ok(created) => {
                info!(barcode = %created.barcode, "Product created");
                Ok(created)
            }
            Err(StoreError::DuplicateBarcode(_)) => {
                warn!(%barcode, "Product already exists");
                Err(ServiceError::Conflict(format!(
                    "Product with barcode '{}' already exists",
                    barcode
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find(&self, barcode: &str) -> Result<Product, ServiceError> {
        self.store
            .find_one(barcode)
            .await?
            .ok_or_else(|| not_found(barcode))
    }

    /// Products whose barcode contains `fragment`, capped at the search limit.
    /// Without a fragment the first products up to the limit are returned.
    pub async fn search(&self, fragment: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        let barcode_contains = fragment
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        Ok(self
            .store
            .find_many(ProductQuery {
                barcode_contains,
                limit: Some(self.search_limit),
            })
            .await?)
    }

    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.store.find_many(ProductQuery::default()).await?)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        barcode: &str,
        changes: ProductChanges,
    ) -> Result<Product, ServiceError> {
        if changes.is_empty() {
            return Err(ServiceError::BadRequest(
                "request body contains no updatable fields".to_string(),
            ));
        }
        changes.validate()?;

        let updated = self
            .store
            .update_one(barcode, changes.normalized())
            .await?
            .ok_or_else(|| not_found(barcode))?;
        info!(barcode = %updated.barcode, "Product updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, barcode: &str) -> Result<Product, ServiceError> {
        let deleted = self
            .store
            .delete_one(barcode)
            .await?
            .ok_or_else(|| not_found(barcode))?;
        info!(barcode = %deleted.barcode, "Product deleted");
        Ok(deleted)
    }

    /// Removes every product, returning how many were deleted
    pub async fn delete_all(&self) -> Result<u64, ServiceError> {
        let deleted = self.store.delete_all().await?;
        info!(deleted, "All products deleted");
        Ok(deleted)
    }
}

fn not_found(barcode: &str) -> ServiceError {
    ServiceError::NotFound(format!(
        "Product with barcode '{}' not found",
        normalize_barcode(barcode)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryProductStore;
    use assert_matches::assert_matches;

    fn service() -> ProductService {
        ProductService::new(Arc::new(InMemoryProductStore::new()), 5)
    }

    fn new_product(barcode: &str) -> NewProduct {
        NewProduct {
            barcode: barcode.to_string(),
            name: "Widget".to_string(),
            quantity: 4.0,
            warehouse: Some("North".to_string()),
            container_code: None,
        }
    }

    #[tokio::test]
    async fn create_then_find_ignores_case() {
        let service = service();
        let created = service.create(new_product(" SKU-1 ")).await.unwrap();
        assert_eq!(created.barcode, "sku-1");
        assert_eq!(created.container_code, "Unassigned");

        let found = service.find("sku-1").await.unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let service = service();
        service.create(new_product("sku-1")).await.unwrap();
        assert_matches!(
            service.create(new_product("SKU-1")).await,
            Err(ServiceError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn invalid_create_is_validation_error() {
        let mut product = new_product("sku-1");
        product.quantity = -1.0;
        assert_matches!(
            service().create(product).await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn search_applies_limit() {
        let service = service();
        for i in 0..7 {
            service.create(new_product(&format!("box-{i}"))).await.unwrap();
        }
        service.create(new_product("crate-1")).await.unwrap();

        assert_eq!(service.search(Some("BOX")).await.unwrap().len(), 5);
        assert_eq!(service.search(Some("crate")).await.unwrap().len(), 1);
        assert_eq!(service.search(Some("  ")).await.unwrap().len(), 5);
        assert_eq!(service.search(None).await.unwrap().len(), 5);
        assert_eq!(service.list().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let service = service();
        service.create(new_product("sku-1")).await.unwrap();

        assert_matches!(
            service.update("sku-1", ProductChanges::default()).await,
            Err(ServiceError::BadRequest(_))
        );
        assert_matches!(
            service
                .update(
                    "missing",
                    ProductChanges {
                        quantity: Some(1.0),
                        ..Default::default()
                    }
                )
                .await,
            Err(ServiceError::NotFound(_))
        );

        let updated = service
            .update(
                "SKU-1",
                ProductChanges {
                    name: Some(" Renamed ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");

        service.delete("sku-1").await.unwrap();
        assert_matches!(service.find("sku-1").await, Err(ServiceError::NotFound(_)));
        assert_matches!(service.delete("sku-1").await, Err(ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_all_counts() {
        let service = service();
        service.create(new_product("a")).await.unwrap();
        service.create(new_product("b")).await.unwrap();
        assert_eq!(service.delete_all().await.unwrap(), 2);
    }
}
