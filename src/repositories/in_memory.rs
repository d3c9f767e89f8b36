use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{ProductStore, StoreError};
use crate::entities::product::Model as Product;
use crate::models::{normalize_barcode, ProductChanges, ProductQuery, ProductRecord};

/// Process-local product store with the same uniqueness rules as the database
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
    closed: AtomicBool,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("in-memory store is closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, record: ProductRecord) -> Result<Product, StoreError> {
        self.ensure_open()?;
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.barcode == record.barcode) {
            return Err(StoreError::DuplicateBarcode(record.barcode));
        }
        let product = Product::from_record(record);
        products.push(product.clone());
        Ok(product)
    }

    async fn find_one(&self, barcode: &str) -> Result<Option<Product>, StoreError> {
        self.ensure_open()?;
        let barcode = normalize_barcode(barcode);
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.barcode == barcode).cloned())
    }

    async fn find_many(&self, query: ProductQuery) -> Result<Vec<Product>, StoreError> {
        self.ensure_open()?;
        let fragment = query
            .barcode_contains
            .as_deref()
            .map(normalize_barcode)
            .unwrap_or_default();
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);

        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| p.barcode.contains(&fragment))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_one(
        &self,
        barcode: &str,
        changes: ProductChanges,
    ) -> Result<Option<Product>, StoreError> {
        self.ensure_open()?;
        let barcode = normalize_barcode(barcode);
        let mut products = self.products.write().await;
        let Some(product) = products.iter_mut().find(|p| p.barcode == barcode) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(quantity) = changes.quantity {
            product.quantity = quantity;
        }
        if let Some(warehouse) = changes.warehouse {
            product.warehouse = warehouse;
        }
        if let Some(container_code) = changes.container_code {
            product.container_code = container_code;
        }
        product.updated_at = Some(Utc::now());

        Ok(Some(product.clone()))
    }

    async fn delete_one(&self, barcode: &str) -> Result<Option<Product>, StoreError> {
        self.ensure_open()?;
        let barcode = normalize_barcode(barcode);
        let mut products = self.products.write().await;
        Ok(products
            .iter()
            .position(|p| p.barcode == barcode)
            .map(|idx| products.remove(idx)))
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut products = self.products.write().await;
        let deleted = products.len() as u64;
        products.clear();
        Ok(deleted)
    }

    async fn bulk_insert(&self, records: Vec<ProductRecord>) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut products = self.products.write().await;

        let mut barcodes: HashSet<&str> = products.iter().map(|p| p.barcode.as_str()).collect();
        for record in &records {
            if !barcodes.insert(record.barcode.as_str()) {
                return Err(StoreError::DuplicateBarcode(record.barcode.clone()));
            }
        }

        let inserted = records.len() as u64;
        products.extend(records.into_iter().map(Product::from_record));
        Ok(inserted)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(barcode: &str) -> ProductRecord {
        ProductRecord {
            barcode: barcode.to_string(),
            name: "Widget".to_string(),
            quantity: 1.0,
            warehouse: "West".to_string(),
            container_code: "C-1".to_string(),
        }
    }

    #[tokio::test]
    async fn bulk_insert_rejects_whole_batch_on_conflict() {
        let store = InMemoryProductStore::new();
        store.create(record("a1")).await.unwrap();

        let err = store
            .bulk_insert(vec![record("b2"), record("a1")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateBarcode(ref b) if b == "a1"));
        assert!(store.find_one("b2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bulk_insert_rejects_duplicates_within_batch() {
        let store = InMemoryProductStore::new();
        assert!(store
            .bulk_insert(vec![record("a1"), record("a1")])
            .await
            .is_err());
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_many_matches_substring_and_limit() {
        let store = InMemoryProductStore::new();
        store
            .bulk_insert(vec![record("abc-1"), record("abc-2"), record("xyz")])
            .await
            .unwrap();

        let found = store
            .find_many(ProductQuery {
                barcode_contains: Some("ABC".into()),
                limit: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].barcode, "abc-1");

        let all = store.find_many(ProductQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn closed_store_is_unavailable() {
        let store = InMemoryProductStore::new();
        store.close().await.unwrap();
        assert!(matches!(
            store.ping().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.bulk_insert(vec![record("a1")]).await.is_err());
    }
}
