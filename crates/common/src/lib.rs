//! Shared building blocks: logging setup, response envelope types and the
//! outbound HTTP helper used to call third-party services.

pub mod types;
pub mod utils;
pub mod external;
