pub mod products;

pub use products::ProductService;
