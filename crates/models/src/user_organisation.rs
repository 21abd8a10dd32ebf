use sea_orm::{entity::prelude::*, sea_query::OnConflict, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{organisation, user};

/// Membership join table between users and organisations.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_organisation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub organisation_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Organisation,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::Organisation => Entity::belongs_to(organisation::Entity)
                .from(Column::OrganisationId)
                .to(organisation::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<organisation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Organisation.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn is_member<C: ConnectionTrait>(db: &C, user_id: Uuid, organisation_id: Uuid) -> Result<bool, ModelError> {
    let found = Entity::find_by_id((user_id, organisation_id))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(found.is_some())
}

/// Add the membership if absent. Returns `true` when a row was inserted.
///
/// `ON CONFLICT DO NOTHING` keeps concurrent adds of the same pair from failing.
pub async fn add_if_absent<C: ConnectionTrait>(db: &C, user_id: Uuid, organisation_id: Uuid) -> Result<bool, ModelError> {
    let am = ActiveModel {
        user_id: Set(user_id),
        organisation_id: Set(organisation_id),
        created_at: Set(Utc::now().into()),
    };
    let inserted = Entity::insert(am)
        .on_conflict(
            OnConflict::columns([Column::UserId, Column::OrganisationId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(inserted == 1)
}
