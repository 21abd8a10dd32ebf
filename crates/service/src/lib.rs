//! Service layer providing business rules on top of models.
//! - Separates business logic from data access.
//! - Modules with real rules (auth, organisations, roles, invitations, newsletter)
//!   go through repository traits so they can be tested in memory.
//! - Plain CRUD modules are free functions over a `DatabaseConnection`.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod organisation;
pub mod org_role;
pub mod invitation;
pub mod newsletter;
pub mod user_service;
pub mod faq_service;
pub mod billing_service;
pub mod notification_service;
#[cfg(test)]
pub mod test_support;
