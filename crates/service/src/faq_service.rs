use uuid::Uuid;
use chrono::Utc;
use sea_orm::{DatabaseConnection, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;

use models::faq;
use crate::{errors::ServiceError, pagination::{fetch_page, Page, Pagination}};

pub const QUESTION_EXISTS: &str = "question exists";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FaqInput {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub category: String,
}

async fn question_taken(db: &DatabaseConnection, question: &str, except: Option<Uuid>) -> Result<bool, ServiceError> {
    let mut q = faq::Entity::find().filter(faq::Column::Question.eq(question.trim()));
    if let Some(id) = except {
        q = q.filter(faq::Column::Id.ne(id));
    }
    Ok(q.one(db).await?.is_some())
}

pub async fn create_faq(db: &DatabaseConnection, input: &FaqInput) -> Result<faq::Model, ServiceError> {
    let m = faq::new_model(&input.question, &input.answer, &input.category)?;
    if question_taken(db, &m.question, None).await? {
        return Err(ServiceError::Conflict(QUESTION_EXISTS.into()));
    }
    let am: faq::ActiveModel = m.into();
    let created = am.insert(db).await?;
    info!(faq_id = %created.id, "faq_created");
    Ok(created)
}

/// Newest first.
pub async fn list_faqs(db: &DatabaseConnection, opts: Pagination) -> Result<Page<faq::Model>, ServiceError> {
    let select = faq::Entity::find().order_by_desc(faq::Column::CreatedAt);
    fetch_page(db, select, opts).await
}

pub async fn update_faq(db: &DatabaseConnection, id: Uuid, input: &FaqInput) -> Result<faq::Model, ServiceError> {
    faq::validate(&input.question, &input.answer, &input.category)?;
    let found = faq::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("faq"))?;
    if question_taken(db, &input.question, Some(id)).await? {
        return Err(ServiceError::Conflict(QUESTION_EXISTS.into()));
    }
    let mut am: faq::ActiveModel = found.into();
    am.question = Set(input.question.trim().to_string());
    am.answer = Set(input.answer.trim().to_string());
    am.category = Set(input.category.trim().to_string());
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_faq(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = faq::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("faq"));
    }
    info!(faq_id = %id, "faq_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn faq_crud_and_duplicate_question() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let input = FaqInput {
            question: format!("How do invites work {}?", Uuid::new_v4()),
            answer: "Owners send links.".into(),
            category: "invitations".into(),
        };
        let created = create_faq(&db, &input).await?;
        assert!(matches!(create_faq(&db, &input).await, Err(ServiceError::Conflict(_))));

        let changed = FaqInput { answer: "Owners send links by email.".into(), ..input.clone() };
        let updated = update_faq(&db, created.id, &changed).await?;
        assert_eq!(updated.answer, "Owners send links by email.");

        let page = list_faqs(&db, Pagination::default()).await?;
        assert!(page.items.iter().any(|f| f.id == created.id));

        delete_faq(&db, created.id).await?;
        assert!(matches!(delete_faq(&db, created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn missing_answer_is_validation_error() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let r = create_faq(&db, &FaqInput { question: "Q?".into(), ..Default::default() }).await;
        assert!(matches!(r, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
