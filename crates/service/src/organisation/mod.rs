//! Organisations: CRUD, membership and the owner gate shared by roles and invitations.

pub mod repository;
#[cfg(feature = "seaorm")]
pub mod seaorm;
pub mod service;

pub use service::{ensure_owner, OrganisationService};
