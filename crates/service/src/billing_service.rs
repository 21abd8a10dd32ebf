use uuid::Uuid;
use chrono::Utc;
use sea_orm::{DatabaseConnection, ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;

use models::billing;
use crate::{errors::ServiceError, pagination::{fetch_page, Page, Pagination}};

#[derive(Clone, Debug, Deserialize)]
pub struct BillingInput {
    #[serde(alias = "title")]
    pub name: String,
    pub price: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BillingPatch {
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

pub async fn create_plan(db: &DatabaseConnection, input: &BillingInput) -> Result<billing::Model, ServiceError> {
    let am: billing::ActiveModel = billing::new_model(&input.name, input.price)?.into();
    let created = am.insert(db).await?;
    info!(plan_id = %created.id, "billing_plan_created");
    Ok(created)
}

pub async fn get_plan(db: &DatabaseConnection, id: Uuid) -> Result<billing::Model, ServiceError> {
    billing::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("billing plan"))
}

/// Cheapest first.
pub async fn list_plans(db: &DatabaseConnection, opts: Pagination) -> Result<Page<billing::Model>, ServiceError> {
    let select = billing::Entity::find().order_by_asc(billing::Column::Price);
    fetch_page(db, select, opts).await
}

pub async fn update_plan(db: &DatabaseConnection, id: Uuid, patch: &BillingPatch) -> Result<billing::Model, ServiceError> {
    let found = get_plan(db, id).await?;
    let name = patch.name.clone().unwrap_or_else(|| found.name.clone());
    let price = patch.price.unwrap_or(found.price);
    billing::validate(&name, price)?;
    let mut am: billing::ActiveModel = found.into();
    am.name = Set(name.trim().to_string());
    am.price = Set(price);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_plan(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = billing::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("billing plan"));
    }
    info!(plan_id = %id, "billing_plan_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[test]
    fn title_is_accepted_as_name() {
        let input: BillingInput = serde_json::from_str(r#"{"title":"Pro","price":19.5}"#).unwrap();
        assert_eq!(input.name, "Pro");
    }

    #[tokio::test]
    async fn billing_plan_crud() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let plan = create_plan(&db, &BillingInput { name: "Starter".into(), price: 0.0 }).await?;
        let patched = update_plan(&db, plan.id, &BillingPatch { price: Some(9.99), ..Default::default() }).await?;
        assert_eq!(patched.name, "Starter");
        assert!((patched.price - 9.99).abs() < f64::EPSILON);
        assert!(matches!(
            update_plan(&db, plan.id, &BillingPatch { price: Some(-1.0), ..Default::default() }).await,
            Err(ServiceError::Validation(_))
        ));

        delete_plan(&db, plan.id).await?;
        assert!(matches!(get_plan(&db, plan.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
