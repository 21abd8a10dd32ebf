use sea_orm::entity::prelude::*;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::organisation;

pub const MAX_ROLE_NAME_LEN: usize = 20;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "org_role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub organisation_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Organisation,
    Permission,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organisation => Entity::belongs_to(organisation::Entity)
                .from(Column::OrganisationId)
                .to(organisation::Column::Id)
                .into(),
            Relation::Permission => Entity::has_one(crate::permission::Entity).into(),
        }
    }
}

impl Related<crate::permission::Entity> for Entity {
    fn to() -> RelationDef { Relation::Permission.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let name = name.trim();
    if name.is_empty() { return Err(ModelError::Validation("role name required".into())); }
    if name.chars().count() > MAX_ROLE_NAME_LEN {
        return Err(ModelError::Validation(format!("role name too long (<={MAX_ROLE_NAME_LEN})")));
    }
    Ok(())
}

pub fn new_model(organisation_id: Uuid, name: &str, description: &str) -> Result<Model, ModelError> {
    validate_name(name)?;
    let now = Utc::now().into();
    Ok(Model {
        id: Uuid::new_v4(),
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        organisation_id,
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_is_bounded() {
        assert!(validate_name("billing-admins").is_ok());
        assert!(validate_name(&"x".repeat(21)).is_err());
        assert!(validate_name("   ").is_err());
    }
}
