pub mod product;

pub use product::{
    normalize_barcode, NewProduct, ProductChanges, ProductQuery, ProductRecord,
    DEFAULT_CONTAINER_CODE, DEFAULT_WAREHOUSE,
};
