//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_user;
mod m20240601_000002_create_user_credentials;
mod m20240601_000003_create_organisation;
mod m20240601_000004_create_user_organisation;
mod m20240601_000005_create_org_role;
mod m20240601_000006_create_permission;
mod m20240601_000007_create_invitation;
mod m20240601_000008_create_newsletter;
mod m20240601_000009_create_faq;
mod m20240601_000010_create_billing;
mod m20240601_000011_create_notification;
mod m20240601_000012_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_user::Migration),
            Box::new(m20240601_000002_create_user_credentials::Migration),
            Box::new(m20240601_000003_create_organisation::Migration),
            Box::new(m20240601_000004_create_user_organisation::Migration),
            Box::new(m20240601_000005_create_org_role::Migration),
            Box::new(m20240601_000006_create_permission::Migration),
            Box::new(m20240601_000007_create_invitation::Migration),
            Box::new(m20240601_000008_create_newsletter::Migration),
            Box::new(m20240601_000009_create_faq::Migration),
            Box::new(m20240601_000010_create_billing::Migration),
            Box::new(m20240601_000011_create_notification::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000012_add_indexes::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_registered_in_order() {
        let names: Vec<String> = Migrator::migrations().iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names.len(), 12);
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.last().is_some_and(|n| n.ends_with("add_indexes")));
    }
}
