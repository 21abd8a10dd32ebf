//! Invitation issuance and acceptance.

pub mod repository;
#[cfg(feature = "seaorm")]
pub mod seaorm;
pub mod service;
pub mod token;

pub use service::{InvitationConfig, InvitationService, CreateInvitation, SendInvites, SentInvitation, BatchResult};
