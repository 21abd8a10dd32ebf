//! Organisation roles and their permission flags. Every operation is gated on
//! organisation ownership.

pub mod repository;
#[cfg(feature = "seaorm")]
pub mod seaorm;
pub mod service;

pub use service::{OrgRoleService, RoleInput, RolePatch, PermissionUpdate, RoleWithPermissions};
