//! Auth module: three-layer architecture (domain, repository, service).
//!
//! This module centralizes registration, login and password changes under the service crate.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod token;

pub use service::AuthService;
