pub mod errors;
pub mod extract;
pub mod metrics;
pub mod openapi;
pub mod rate_limiter;
pub mod routes;
pub mod startup;

pub use startup::run;
