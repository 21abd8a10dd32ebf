use sea_orm::entity::prelude::*;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "billing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(name: &str, price: f64) -> Result<(), ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("plan name required".into())); }
    if !price.is_finite() || price < 0.0 { return Err(ModelError::Validation("price must be a non-negative number".into())); }
    Ok(())
}

pub fn new_model(name: &str, price: f64) -> Result<Model, ModelError> {
    validate(name, price)?;
    let now = Utc::now().into();
    Ok(Model { id: Uuid::new_v4(), name: name.trim().to_string(), price, created_at: now, updated_at: now })
}
