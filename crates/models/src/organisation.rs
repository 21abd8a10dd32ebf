use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organisation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub email: String,
    pub state: String,
    pub industry: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub org_type: String,
    pub owner_id: Uuid,
    pub address: String,
    pub country: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
    Memberships,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity).from(Column::OwnerId).to(user::Column::Id).into(),
            Relation::Memberships => Entity::has_many(crate::user_organisation::Entity).into(),
        }
    }
}

impl Related<crate::user_organisation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Memberships.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields accepted when creating an organisation. Text fields are stored lowercased.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewOrganisation {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub email: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, rename = "type")]
    pub org_type: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub country: String,
}

impl NewOrganisation {
    /// Lowercase/trim every field and validate required ones.
    pub fn normalized(&self) -> Result<Self, ModelError> {
        let clean = |s: &str| s.trim().to_lowercase();
        let out = Self {
            name: clean(&self.name),
            description: clean(&self.description),
            email: user::normalize_email(&self.email),
            state: clean(&self.state),
            industry: clean(&self.industry),
            org_type: clean(&self.org_type),
            address: clean(&self.address),
            country: clean(&self.country),
        };
        if out.name.is_empty() { return Err(ModelError::Validation("organisation name required".into())); }
        if out.name.len() > 255 { return Err(ModelError::Validation("organisation name too long (<=255)".into())); }
        user::validate_email(&out.email)?;
        Ok(out)
    }

    pub fn into_model(self, owner_id: Uuid) -> Model {
        let now = Utc::now().into();
        Model {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            email: self.email,
            state: self.state,
            industry: self.industry,
            org_type: self.org_type,
            owner_id,
            address: self.address,
            country: self.country,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update; `None` keeps the current value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrganisationPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub state: Option<String>,
    pub industry: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

impl OrganisationPatch {
    pub fn apply(&self, m: &mut Model) -> Result<(), ModelError> {
        let clean = |s: &String| s.trim().to_lowercase();
        if let Some(name) = &self.name {
            let name = clean(name);
            if name.is_empty() { return Err(ModelError::Validation("organisation name required".into())); }
            m.name = name;
        }
        if let Some(email) = &self.email {
            let email = user::normalize_email(email);
            user::validate_email(&email)?;
            m.email = email;
        }
        if let Some(v) = &self.description { m.description = clean(v); }
        if let Some(v) = &self.state { m.state = clean(v); }
        if let Some(v) = &self.industry { m.industry = clean(v); }
        if let Some(v) = &self.org_type { m.org_type = clean(v); }
        if let Some(v) = &self.address { m.address = clean(v); }
        if let Some(v) = &self.country { m.country = clean(v); }
        m.updated_at = Utc::now().into();
        Ok(())
    }
}

pub async fn insert(db: &DatabaseConnection, m: Model) -> Result<Model, ModelError> {
    let am: ActiveModel = m.into();
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_live(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn soft_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ModelError> {
    let found = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?
        .ok_or_else(|| ModelError::Validation("organisation not found".into()))?;
    let mut am: ActiveModel = found.into();
    am.deleted_at = Set(Some(Utc::now().into()));
    am.update(db).await.map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_lowercases_fields() {
        let n = NewOrganisation {
            name: "  ACME Corp ".into(),
            email: "Info@ACME.io".into(),
            country: "Nigeria".into(),
            ..Default::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(n.name, "acme corp");
        assert_eq!(n.email, "info@acme.io");
        assert_eq!(n.country, "nigeria");
    }

    #[test]
    fn normalized_rejects_bad_email() {
        let r = NewOrganisation { name: "acme".into(), email: "nope".into(), ..Default::default() }.normalized();
        assert!(r.is_err());
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let mut m = NewOrganisation { name: "acme".into(), email: "a@acme.io".into(), state: "lagos".into(), ..Default::default() }
            .normalized()
            .unwrap()
            .into_model(Uuid::new_v4());
        OrganisationPatch { name: Some("Globex".into()), ..Default::default() }.apply(&mut m).unwrap();
        assert_eq!(m.name, "globex");
        assert_eq!(m.state, "lagos");
    }
}
