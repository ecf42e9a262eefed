use crate::model::role::Role;
use crate::model::user::UserResponse;
use crate::models::{
    AuthResponse, LoginRequest, OtpRequest, OtpVerificationRequest, PasswordChangeRequest,
    TeamMemberResponse, UpdateProfileRequest,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StaffHub API",
        version = "1.0.0",
        description = r#"
## StaffHub — role-hierarchical user management

This API manages a three-role organization: **Admins** invite **Managers**
and **Employees**, employees hang off exactly one manager.

### 🔹 Key Features
- **OTP-gated registration**
  - Admin initiates, invitee proves inbox control, account is materialized
    with a temporary password delivered by email
- **JWT sessions**
  - Access + rotating refresh tokens, logout revocation
- **Team views**
  - Managers list their team, employees see their manager and team-mates

### 🔐 Security
Endpoints under `/api` are protected with **JWT Bearer authentication**;
a static role table gates the `/api/admin`, `/api/managers` and
`/api/employees` scopes.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::admin::initiate_manager_registration,
        crate::api::admin::initiate_employee_registration,
        crate::api::admin::list_users,
        crate::api::admin::get_user,
        crate::api::admin::update_user,
        crate::api::admin::delete_user,
        crate::api::admin::toggle_user_status,
        crate::api::admin::list_managers,
        crate::api::admin::list_employees,
        crate::api::admin::manager_employees,
        crate::api::admin::get_profile,
        crate::api::admin::update_profile,
        crate::api::admin::change_password,

        crate::api::manager::get_profile,
        crate::api::manager::update_profile,
        crate::api::manager::change_password,
        crate::api::manager::get_team,
        crate::api::manager::get_team_member,

        crate::api::employee::get_profile,
        crate::api::employee::update_profile,
        crate::api::employee::change_password,
        crate::api::employee::get_manager,
        crate::api::employee::get_team_mates,
    ),
    components(
        schemas(
            Role,
            UserResponse,
            TeamMemberResponse,
            LoginRequest,
            AuthResponse,
            OtpRequest,
            OtpVerificationRequest,
            PasswordChangeRequest,
            UpdateProfileRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admin", description = "Administration and registration initiation"),
        (name = "Manager", description = "Manager profile and team APIs"),
        (name = "Employee", description = "Employee profile APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
