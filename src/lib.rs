pub mod config;
pub mod error;
pub mod parse;
pub mod rules;
pub mod validate;
pub mod wasm;

pub use config::ValidatorConfig;
pub use error::ValidatorError;
pub use validate::{ValidationResult, WorkflowValidator, validate_workflow};
