//! HTTP protocol layer module
//!
//! Query-string and cookie parsing plus response builders, decoupled from
//! routing and validation logic.

pub mod query;
pub mod response;

// Re-export commonly used builders
pub use response::{error_response, json_response, method_not_allowed, payload_too_large};
