use sea_orm::{entity::prelude::*, sea_query::Expr};
use uuid::Uuid;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::organisation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invitation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organisation_id: Uuid,
    pub inviter_id: Uuid,
    pub email: String,
    #[sea_orm(unique)]
    pub token: String,
    pub is_valid: bool,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Organisation }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organisation => Entity::belongs_to(organisation::Entity)
                .from(Column::OrganisationId)
                .to(organisation::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `expires_at <= now` counts as expired.
    pub fn is_expired_at(&self, now: DateTimeWithTimeZone) -> bool {
        self.expires_at <= now
    }
}

pub fn new_model(organisation_id: Uuid, inviter_id: Uuid, email: &str, token: &str, ttl: Duration) -> Result<Model, ModelError> {
    if token.is_empty() { return Err(ModelError::Validation("token required".into())); }
    let now = Utc::now();
    Ok(Model {
        id: Uuid::new_v4(),
        organisation_id,
        inviter_id,
        email: crate::user::normalize_email(email),
        token: token.to_string(),
        is_valid: true,
        expires_at: (now + ttl).into(),
        created_at: now.into(),
    })
}

pub async fn find_by_token<C: ConnectionTrait>(db: &C, token: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Token.eq(token))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Flip `is_valid` from true to false for `token`.
///
/// The update is conditional on the current value, so of two concurrent callers
/// exactly one sees `true`.
pub async fn consume<C: ConnectionTrait>(db: &C, token: &str) -> Result<bool, ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::IsValid, Expr::value(false))
        .filter(Column::Token.eq(token))
        .filter(Column::IsValid.eq(true))
        .exec(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected == 1)
}
