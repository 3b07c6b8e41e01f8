pub mod field_extractor;
pub mod protocol;
pub mod service;
