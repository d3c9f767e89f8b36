use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductRecord;

/// Product stored in a warehouse, keyed by barcode
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
#[schema(as = Product)]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Lower-cased barcode, unique across the store
    #[sea_orm(unique)]
    pub barcode: String,

    /// Product name
    pub name: String,

    /// Quantity on hand
    #[sea_orm(column_type = "Double")]
    pub quantity: f64,

    /// Warehouse holding the product
    pub warehouse: String,

    /// Container the product is stored in
    pub container_code: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            if active_model.id.is_not_set() {
                active_model.id = Set(Uuid::new_v4());
            }
            active_model.created_at = Set(Utc::now());
        } else {
            active_model.updated_at = Set(Some(Utc::now()));
        }
        Ok(active_model)
    }
}

impl Model {
    /// Builds a fresh model for a validated record
    pub fn from_record(record: ProductRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            barcode: record.barcode,
            name: record.name,
            quantity: record.quantity,
            warehouse: record.warehouse,
            container_code: record.container_code,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl From<ProductRecord> for ActiveModel {
    fn from(record: ProductRecord) -> Self {
        let model = Model::from_record(record);
        Self {
            id: Set(model.id),
            barcode: Set(model.barcode),
            name: Set(model.name),
            quantity: Set(model.quantity),
            warehouse: Set(model.warehouse),
            container_code: Set(model.container_code),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}
