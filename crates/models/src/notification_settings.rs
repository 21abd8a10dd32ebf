use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub mobile_push_notifications: bool,
    pub email_notification_activity_in_workspace: bool,
    pub email_notification_always_send_email_notifications: bool,
    pub email_notification_email_digest: bool,
    pub email_notification_announcement_and_update_emails: bool,
    pub slack_notifications_activity_on_your_workspace: bool,
    pub slack_notifications_always_send_email_notifications: bool,
    pub slack_notifications_announcement_and_update_emails: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Partial update of the settings; absent fields keep their value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub mobile_push_notifications: Option<bool>,
    pub email_notification_activity_in_workspace: Option<bool>,
    pub email_notification_always_send_email_notifications: Option<bool>,
    pub email_notification_email_digest: Option<bool>,
    pub email_notification_announcement_and_update_emails: Option<bool>,
    pub slack_notifications_activity_on_your_workspace: Option<bool>,
    pub slack_notifications_always_send_email_notifications: Option<bool>,
    pub slack_notifications_announcement_and_update_emails: Option<bool>,
}

/// All flags default to off.
pub fn defaults_for(user_id: Uuid) -> Model {
    Model {
        id: Uuid::new_v4(),
        user_id,
        mobile_push_notifications: false,
        email_notification_activity_in_workspace: false,
        email_notification_always_send_email_notifications: false,
        email_notification_email_digest: false,
        email_notification_announcement_and_update_emails: false,
        slack_notifications_activity_on_your_workspace: false,
        slack_notifications_always_send_email_notifications: false,
        slack_notifications_announcement_and_update_emails: false,
    }
}

impl SettingsPatch {
    pub fn apply(&self, m: &mut Model) {
        macro_rules! set {
            ($($f:ident),* $(,)?) => { $( if let Some(v) = self.$f { m.$f = v; } )* };
        }
        set!(
            mobile_push_notifications,
            email_notification_activity_in_workspace,
            email_notification_always_send_email_notifications,
            email_notification_email_digest,
            email_notification_announcement_and_update_emails,
            slack_notifications_activity_on_your_workspace,
            slack_notifications_always_send_email_notifications,
            slack_notifications_announcement_and_update_emails,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_given_flags() {
        let mut m = defaults_for(Uuid::new_v4());
        SettingsPatch { email_notification_email_digest: Some(true), ..Default::default() }.apply(&mut m);
        assert!(m.email_notification_email_digest);
        assert!(!m.mobile_push_notifications);
    }
}
