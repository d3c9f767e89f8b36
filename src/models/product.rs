use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Warehouse assigned to products that arrive without one
pub const DEFAULT_WAREHOUSE: &str = "Unknown Warehouse";

/// Container code assigned to products that arrive without one
pub const DEFAULT_CONTAINER_CODE: &str = "Unassigned";

/// Validated, normalized product ready for persistence.
///
/// `barcode` is trimmed and lower-cased, every other string is trimmed and
/// `quantity` is finite and strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub barcode: String,
    pub name: String,
    pub quantity: f64,
    pub warehouse: String,
    pub container_code: String,
}

/// Normalizes a barcode the way it is keyed in the store
pub fn normalize_barcode(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Product submitted through the create endpoint
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(custom = "validate_not_blank")]
    pub barcode: String,
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(custom = "validate_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub container_code: Option<String>,
}

impl NewProduct {
    /// Validates the payload and normalizes it into a [`ProductRecord`]
    pub fn into_record(self) -> Result<ProductRecord, validator::ValidationErrors> {
        self.validate()?;
        Ok(ProductRecord {
            barcode: normalize_barcode(&self.barcode),
            name: self.name.trim().to_string(),
            quantity: self.quantity,
            warehouse: non_blank(self.warehouse).unwrap_or_else(|| DEFAULT_WAREHOUSE.to_string()),
            container_code: non_blank(self.container_code)
                .unwrap_or_else(|| DEFAULT_CONTAINER_CODE.to_string()),
        })
    }
}

/// Partial update; the barcode is immutable and never part of a change set
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    #[validate(custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(custom = "validate_quantity")]
    pub quantity: Option<f64>,
    pub warehouse: Option<String>,
    pub container_code: Option<String>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.warehouse.is_none()
            && self.container_code.is_none()
    }

    /// Trims every provided string field
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|v| v.trim().to_string()),
            quantity: self.quantity,
            warehouse: self.warehouse.map(|v| v.trim().to_string()),
            container_code: self.container_code.map(|v| v.trim().to_string()),
        }
    }
}

/// Lookup parameters for `find_many`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    /// Case-insensitive barcode substring
    pub barcode_contains: Option<String>,
    pub limit: Option<u64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn validate_quantity(quantity: f64) -> Result<(), ValidationError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        let mut err = ValidationError::new("quantity");
        err.message = Some("quantity must be a finite number greater than zero".into());
        return Err(err);
    }
    Ok(())
}
