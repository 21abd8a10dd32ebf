use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub first_name: String, pub last_name: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct CreateOrganisationRequest {
    pub name: String,
    pub description: String,
    pub email: String,
    pub state: String,
    pub industry: String,
    pub r#type: String,
    pub address: String,
    pub country: String,
}

#[derive(ToSchema)]
pub struct CreateRoleRequest { pub name: String, pub description: String }

#[derive(ToSchema)]
pub struct CreateInvitationRequest { pub email: String, pub org_id: String }

#[derive(ToSchema)]
pub struct SendInvitesRequest { pub emails: Vec<String>, pub org_id: String }

#[derive(ToSchema)]
pub struct FaqRequest { pub question: String, pub answer: String, pub category: String }

#[derive(ToSchema)]
pub struct BillingRequest { pub name: String, pub price: f64 }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::change_password,
        crate::routes::users::get,
        crate::routes::users::update,
        crate::routes::users::delete,
        crate::routes::users::organisations,
        crate::routes::users::assign_role,
        crate::routes::users::list,
        crate::routes::organisations::create,
        crate::routes::organisations::get,
        crate::routes::organisations::update,
        crate::routes::organisations::delete,
        crate::routes::organisations::list_users,
        crate::routes::organisations::add_user,
        crate::routes::org_roles::create,
        crate::routes::org_roles::list,
        crate::routes::org_roles::get,
        crate::routes::org_roles::update,
        crate::routes::org_roles::delete,
        crate::routes::org_roles::update_permissions,
        crate::routes::invitations::create,
        crate::routes::invitations::send_batch,
        crate::routes::invitations::accept,
        crate::routes::invitations::accept_token,
        crate::routes::invitations::deactivate,
        crate::routes::invitations::list,
        crate::routes::newsletter::subscribe,
        crate::routes::newsletter::list,
        crate::routes::newsletter::list_deleted,
        crate::routes::newsletter::delete,
        crate::routes::newsletter::restore,
        crate::routes::faq::create,
        crate::routes::faq::list,
        crate::routes::faq::update,
        crate::routes::faq::delete,
        crate::routes::billing::create,
        crate::routes::billing::list,
        crate::routes::billing::get,
        crate::routes::billing::update,
        crate::routes::billing::delete,
        crate::routes::notifications::create,
        crate::routes::notifications::list,
        crate::routes::notifications::list_by_read_state,
        crate::routes::notifications::update,
        crate::routes::notifications::delete,
        crate::routes::notifications::get_settings,
        crate::routes::notifications::update_settings,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CreateOrganisationRequest,
            CreateRoleRequest,
            CreateInvitationRequest,
            SendInvitesRequest,
            FaqRequest,
            BillingRequest,
            crate::routes::auth::SessionOutput,
            crate::routes::users::UpdateUserInput,
            crate::routes::organisations::AddUserInput,
            crate::routes::invitations::InvitationLinkInput,
            crate::routes::newsletter::SubscribeInput,
            crate::routes::notifications::NotificationInput,
            crate::routes::notifications::ReadStateInput,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "organisations"),
        (name = "roles"),
        (name = "invitations"),
        (name = "newsletter"),
        (name = "faq"),
        (name = "billing"),
        (name = "notifications")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_invitation_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/invite/create"));
        assert!(doc.paths.paths.contains_key("/api/v1/invite/accept"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
