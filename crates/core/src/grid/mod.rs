//! Precomputed downwash fields and their loaders

pub mod field_dictionary;
pub mod grid_field;
pub mod loader;

// Re-export main types
pub use field_dictionary::FieldDictionary;
pub use grid_field::{CellValue, GridField, PressureField, VelocityField};
