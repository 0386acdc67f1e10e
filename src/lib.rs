pub mod compliance;
pub mod core;
pub mod llm;
pub mod main_module;
pub mod platform;
pub mod remediation;
