pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod organisation;
pub mod user_organisation;
pub mod org_role;
pub mod permission;
pub mod invitation;
pub mod newsletter;
pub mod faq;
pub mod billing;
pub mod notification;
pub mod notification_settings;

#[cfg(test)]
mod tests;
