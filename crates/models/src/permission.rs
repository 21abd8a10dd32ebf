use std::collections::BTreeMap;

use sea_orm::entity::prelude::*;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::org_role;

/// Flat map of named permission flags, e.g. `{"can_view_transactions": true}`.
pub type PermissionList = BTreeMap<String, bool>;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "permission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub role_id: Uuid,
    pub category: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub permission_list: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Role }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Role => Entity::belongs_to(org_role::Entity)
                .from(Column::RoleId)
                .to(org_role::Column::Id)
                .into(),
        }
    }
}

impl Related<org_role::Entity> for Entity {
    fn to() -> RelationDef { Relation::Role.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the stored JSON; non-boolean entries are dropped.
    pub fn flags(&self) -> PermissionList {
        match &self.permission_list {
            Json::Object(map) => map
                .iter()
                .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
                .collect(),
            _ => PermissionList::new(),
        }
    }
}

pub fn to_json(list: &PermissionList) -> Json {
    Json::Object(list.iter().map(|(k, v)| (k.clone(), Json::Bool(*v))).collect())
}

pub fn new_model(role_id: Uuid, category: &str, list: &PermissionList) -> Result<Model, ModelError> {
    if list.keys().any(|k| k.trim().is_empty()) {
        return Err(ModelError::Validation("permission name required".into()));
    }
    let now = Utc::now().into();
    Ok(Model {
        id: Uuid::new_v4(),
        role_id,
        category: category.trim().to_string(),
        permission_list: to_json(list),
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_roundtrip_through_json() {
        let mut list = PermissionList::new();
        list.insert("can_view_transactions".into(), true);
        list.insert("can_edit_users".into(), false);
        let m = new_model(Uuid::new_v4(), "transactions", &list).unwrap();
        assert_eq!(m.flags(), list);
    }

    #[test]
    fn non_bool_entries_are_ignored() {
        let mut m = new_model(Uuid::new_v4(), "x", &PermissionList::new()).unwrap();
        m.permission_list = serde_json::json!({"a": true, "b": "yes"});
        assert_eq!(m.flags().len(), 1);
    }
}
