//! OpenAPI documentation configuration.
//!
//! Generates the OpenAPI document served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::content::ContentKind;
use crate::domain::member::{
    CouncilOffice, Member, MemberRole, MemberStatus, MowcubPosition,
};
use crate::domain::user::PublicUser;
use crate::domain::{DomainError, ErrorCode};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest, SessionUser};
use crate::inbound::http::members::HandoverRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Statesmen portal API",
        description = "Membership admission, authorization, and directory endpoints."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::members::list_members,
        crate::inbound::http::members::get_member,
        crate::inbound::http::members::approve_member,
        crate::inbound::http::members::reject_member,
        crate::inbound::http::members::ban_member,
        crate::inbound::http::members::handover_secretary,
    ),
    components(schemas(
        DomainError,
        ErrorCode,
        PublicUser,
        Member,
        MemberStatus,
        MemberRole,
        CouncilOffice,
        MowcubPosition,
        ContentKind,
        RegisterRequest,
        LoginRequest,
        SessionUser,
        HandoverRequest,
    )),
    tags(
        (name = "auth", description = "Registration, login, and session state"),
        (name = "members", description = "Member directory and lifecycle administration")
    )
)]
pub struct ApiDoc;
