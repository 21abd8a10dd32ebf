use crate::db::connect;
use crate::{invitation, organisation, user, user_credentials, user_organisation};
use anyhow::Result;
use chrono::Duration;
use migration::MigratorTrait;
use sea_orm::EntityTrait;
use uuid::Uuid;

/// user -> credentials -> organisation -> membership -> invitation consume
#[tokio::test]
async fn test_membership_and_invitation_workflow() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;

    let email = format!("crud_{}@example.com", Uuid::new_v4());
    let owner = user::create(&db, &email, "Crud Owner", user::UserRole::User).await?;
    let cred = user_credentials::upsert_password(&db, owner.id, "$argon2id$fake".into(), "argon2").await?;
    assert_eq!(cred.user_id, owner.id);

    let org = organisation::NewOrganisation {
        name: "Crud Org".into(),
        email: format!("org_{}@example.com", Uuid::new_v4()),
        ..Default::default()
    }
    .normalized()?
    .into_model(owner.id);
    let org = organisation::insert(&db, org).await?;

    assert!(user_organisation::add_if_absent(&db, owner.id, org.id).await?);
    assert!(!user_organisation::add_if_absent(&db, owner.id, org.id).await?);
    assert!(user_organisation::is_member(&db, owner.id, org.id).await?);

    let token = format!("tok{}", Uuid::new_v4().simple());
    let inv = invitation::new_model(org.id, owner.id, "Guest@Example.com", &token, Duration::hours(1))?;
    let am: invitation::ActiveModel = inv.into();
    sea_orm::ActiveModelTrait::insert(am, &db).await?;

    assert!(invitation::consume(&db, &token).await?);
    assert!(!invitation::consume(&db, &token).await?);
    let after = invitation::find_by_token(&db, &token).await?.unwrap();
    assert!(!after.is_valid);

    organisation::Entity::delete_by_id(org.id).exec(&db).await?;
    user::hard_delete(&db, owner.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_duplicate_user_email_rejected_by_db() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }

    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;

    let email = format!("dup_{}@example.com", Uuid::new_v4());
    let first = user::create(&db, &email, "First", user::UserRole::User).await?;
    let second = user::create(&db, &email.to_uppercase(), "Second", user::UserRole::User).await;
    assert!(matches!(second, Err(crate::errors::ModelError::Duplicate(_))));

    let found = user::find_by_email(&db, &email).await?.unwrap();
    assert_eq!(found.id, first.id);
    user::hard_delete(&db, first.id).await?;
    Ok(())
}
