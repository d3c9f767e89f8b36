pub mod health;
pub mod import;
pub mod products;

use std::path::Path;

use crate::import::ImportCoordinator;
use crate::repositories::ProductStore;
use crate::services::ProductService;

pub use crate::AppState;

/// State needed by the product CRUD handlers
pub trait ProductHandlerState: Clone + Send + Sync + 'static {
    fn product_service(&self) -> &ProductService;
}

/// State needed by the CSV upload handler
pub trait ImportHandlerState: Clone + Send + Sync + 'static {
    fn import_coordinator(&self) -> &ImportCoordinator;

    /// Directory uploads are staged in before parsing
    fn upload_dir(&self) -> &Path;
}

/// State needed by the health probe
pub trait HealthHandlerState: Clone + Send + Sync + 'static {
    fn product_store(&self) -> &dyn ProductStore;
}

impl ProductHandlerState for AppState {
    fn product_service(&self) -> &ProductService {
        &self.products
    }
}

impl ImportHandlerState for AppState {
    fn import_coordinator(&self) -> &ImportCoordinator {
        &self.importer
    }

    fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}

impl HealthHandlerState for AppState {
    fn product_store(&self) -> &dyn ProductStore {
        self.store.as_ref()
    }
}
