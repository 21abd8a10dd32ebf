use sea_orm::entity::prelude::*;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "faq")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub question: String,
    pub answer: String,
    pub category: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(question: &str, answer: &str, category: &str) -> Result<(), ModelError> {
    if question.trim().is_empty() || answer.trim().is_empty() || category.trim().is_empty() {
        return Err(ModelError::Validation("question, answer and category are required".into()));
    }
    if question.chars().count() > 225 { return Err(ModelError::Validation("question too long (<=225)".into())); }
    if category.chars().count() > 30 { return Err(ModelError::Validation("category too long (<=30)".into())); }
    Ok(())
}

pub fn new_model(question: &str, answer: &str, category: &str) -> Result<Model, ModelError> {
    validate(question, answer, category)?;
    let now = Utc::now().into();
    Ok(Model {
        id: Uuid::new_v4(),
        question: question.trim().to_string(),
        answer: answer.trim().to_string(),
        category: category.trim().to_string(),
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_rejected() {
        assert!(validate("What?", "", "general").is_err());
        assert!(validate("What?", "That.", "general").is_ok());
        assert!(validate("What?", "That.", &"c".repeat(31)).is_err());
    }
}
