pub mod repository;
#[cfg(feature = "seaorm")]
pub mod seaorm;
pub mod service;

pub use service::NewsletterService;
