pub mod constraints;
pub mod discovery;
pub mod field_model;
pub mod label;
pub mod semantic;
