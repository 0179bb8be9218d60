// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod types;
pub mod utils;

// Re-exports
pub use client::{Backend, DEFAULT_BASE_URL, Gateway};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use types::*;
