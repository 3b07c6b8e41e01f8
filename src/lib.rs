pub mod cli;
pub mod dom;
pub mod error;
pub mod extract;
pub mod extractor;
pub mod fill;
pub mod locator;
pub mod orchestrator;
pub mod report;
pub mod trace;
