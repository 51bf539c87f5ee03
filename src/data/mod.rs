//! Data module - CSV loading, records and filtering

pub mod filter;
pub mod loader;
pub mod model;

pub use filter::{FilterError, FilterSpec};
pub use loader::{DataLoader, LoadError};
pub use model::{Record, Table, UNKNOWN_CATEGORY};
