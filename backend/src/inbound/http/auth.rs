//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"email":..,"password":..,"fullName":..,...}
//! POST /api/v1/auth/login    {"email":..,"password":..}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::DomainError;
use crate::domain::auth::{
    AuthValidationError, LoginCredentials, RegistrationParts, RegistrationRequest,
};
use crate::domain::member::{CouncilOffice, Member, MowcubPosition};
use crate::domain::user::PublicUser;
use crate::inbound::http::ApiResult;
use crate::inbound::http::guards::Authenticated;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration request body for `POST /api/v1/auth/register`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub nickname: Option<String>,
    pub stateship_year: String,
    pub last_mowcub_position: MowcubPosition,
    #[serde(default)]
    pub current_council_office: CouncilOffice,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity payload returned by register, login, and `me`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user: PublicUser,
    pub member: Member,
}

fn map_auth_validation_error(err: AuthValidationError) -> DomainError {
    let field = match &err {
        AuthValidationError::Email(_) => "email",
        AuthValidationError::EmptyPassword | AuthValidationError::PasswordTooShort { .. } => {
            "password"
        }
        AuthValidationError::Member(_) => "profile",
    };
    DomainError::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Register a new account and its pending member profile.
///
/// Registration never signs the caller in; they log in once approved or
/// while pending, subject to the guards on each endpoint.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionUser),
        (status = 400, description = "Invalid request", body = DomainError),
        (status = 409, description = "Email already registered", body = DomainError),
        (status = 503, description = "Storage unavailable", body = DomainError)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = RegistrationRequest::try_from_parts(RegistrationParts {
        email: &body.email,
        password: &body.password,
        full_name: &body.full_name,
        nickname: body.nickname,
        stateship_year: &body.stateship_year,
        last_mowcub_position: body.last_mowcub_position,
        current_council_office: body.current_council_office,
        latitude: body.latitude,
        longitude: body.longitude,
        photo_url: body.photo_url,
        dues_proof_url: body.dues_proof_url,
    })
    .map_err(map_auth_validation_error)?;
    let (user, member) = state.identity.register(request).await?;
    Ok(HttpResponse::Created().json(SessionUser { user, member }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionUser,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = DomainError),
        (status = 401, description = "Invalid credentials", body = DomainError),
        (status = 503, description = "Storage unavailable", body = DomainError)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&body.email, &body.password)
        .map_err(map_auth_validation_error)?;
    let outcome = state.identity.login(credentials).await?;
    session.persist_token(&outcome.session.token)?;
    Ok(HttpResponse::Ok().json(SessionUser {
        user: outcome.user,
        member: outcome.member,
    }))
}

/// Drop the current session. Safe to call without one.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Session cleared")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(token) = session.token()? {
        state.identity.logout(&token);
    }
    session.clear();
    Ok(HttpResponse::Ok().finish())
}

/// Return the caller's identity and current member profile.
///
/// Any live session qualifies; pending members use this to watch their
/// application status.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current identity", body = SessionUser),
        (status = 401, description = "No active session", body = DomainError),
        (status = 503, description = "Storage unavailable", body = DomainError)
    ),
    tags = ["auth"],
    operation_id = "currentIdentity"
)]
#[get("/auth/me")]
pub async fn me(auth: Authenticated) -> ApiResult<web::Json<SessionUser>> {
    let identity = auth.0;
    Ok(web::Json(SessionUser {
        user: PublicUser::from(&identity.user),
        member: identity.member,
    }))
}
