pub mod ai_payload;
pub mod orchestrator;
pub mod response_parser;
pub mod suggest;
