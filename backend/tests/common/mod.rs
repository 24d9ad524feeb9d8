//! Shared helpers for HTTP integration tests.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::json;

use statesmen_backend::domain::member::{MemberRole, MemberStatus, MemberUpdate};
use statesmen_backend::domain::ports::{MemberStore, Storage};
use statesmen_backend::inbound::http::health::HealthState;
use statesmen_backend::outbound::memory::MemoryStorage;
use statesmen_backend::server::{AppDependencies, build_app, build_http_state};

pub const TEST_PASSWORD: &str = "long-enough-password";

/// Application over a shared in-memory backend, sessions never expiring
/// within a test run.
pub fn test_app(
    storage: Arc<MemoryStorage>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let storage: Arc<dyn Storage> = storage;
    build_app(AppDependencies {
        health_state: web::Data::new(HealthState::default()),
        http_state: web::Data::new(build_http_state(storage, 3600)),
        key: Key::generate(),
        cookie_secure: false,
    })
}

pub fn register_body(email: &str, name: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": TEST_PASSWORD,
        "fullName": name,
        "stateshipYear": "2019/2020",
        "lastMowcubPosition": "colonel",
    })
}

/// Register an account through the API and return the member id.
pub async fn register<S, B>(app: &S, email: &str, name: &str) -> uuid::Uuid
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body(email, name))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(response).await;
    body["member"]["id"]
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .expect("member id in registration response")
}

/// Log in through the API and return the session cookie.
pub async fn login<S, B>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), actix_web::http::StatusCode::OK);
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie on login")
}

/// Promote a member to an active secretary directly on the backend.
pub async fn make_secretary(storage: &MemoryStorage, member_id: uuid::Uuid) {
    activate(storage, member_id).await;
    storage
        .update_member(
            statesmen_backend::domain::member::MemberId::from_uuid(member_id),
            MemberUpdate {
                role: Some(MemberRole::Secretary),
                ..MemberUpdate::default()
            },
        )
        .await
        .expect("role update succeeds");
}

/// Mark a member active directly on the backend.
pub async fn activate(storage: &MemoryStorage, member_id: uuid::Uuid) {
    storage
        .update_member(
            statesmen_backend::domain::member::MemberId::from_uuid(member_id),
            MemberUpdate {
                status: Some(MemberStatus::Active),
                ..MemberUpdate::default()
            },
        )
        .await
        .expect("status update succeeds");
}
