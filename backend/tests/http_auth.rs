//! End-to-end coverage of registration, login, and the guard chain.

mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use common::{TEST_PASSWORD, activate, login, make_secretary, register, register_body, test_app};
use rstest::rstest;
use statesmen_backend::domain::member::{MemberId, MemberRole, MemberStatus, MemberUpdate};
use statesmen_backend::domain::ports::MemberStore;
use statesmen_backend::outbound::memory::MemoryStorage;

#[actix_web::test]
async fn registration_creates_a_pending_member() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(Arc::clone(&storage))).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body("ada@example.org", "Ada Lovelace"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["member"]["status"], "pending");
    assert_eq!(body["member"]["role"], "member");
    assert_eq!(body["user"]["email"], "ada@example.org");
    assert!(body["user"].get("passwordHash").is_none());
}

#[actix_web::test]
async fn duplicate_registration_conflicts() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(storage)).await;

    register(&app, "ada@example.org", "Ada").await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body("ada@example.org", "Ada Again"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn short_password_is_rejected_with_field_details() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(storage)).await;

    let mut payload = register_body("ada@example.org", "Ada");
    payload["password"] = json!("short");
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "password");
}

#[actix_web::test]
async fn login_failure_modes_are_indistinguishable() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(storage)).await;
    register(&app, "ada@example.org", "Ada").await;

    let mut bodies = Vec::new();
    for (email, password) in [
        ("nobody@example.org", TEST_PASSWORD),
        ("ada@example.org", "wrong-password"),
    ] {
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": email, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(response).await;
        bodies.push(body);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
async fn pending_members_can_see_themselves_but_not_member_profiles() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(storage)).await;
    let member_id = register(&app, "ada@example.org", "Ada").await;
    let cookie = login(&app, "ada@example.org").await;

    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(me).await;
    assert_eq!(body["member"]["status"], "pending");

    // Profile pages stay behind the active-membership guard.
    let profile = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/members/{member_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(profile.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn requests_without_a_session_are_unauthorized() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(storage)).await;

    let profile = format!("/api/v1/members/{}", MemberId::random());
    for uri in ["/api/v1/auth/me", profile.as_str()] {
        let response =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[actix_web::test]
async fn logout_revokes_the_server_side_session() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(storage)).await;
    register(&app, "ada@example.org", "Ada").await;
    let cookie = login(&app, "ada@example.org").await;

    let logout = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::OK);

    // Even a replayed cookie fails once the server-side record is gone.
    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_ban_takes_effect_on_the_next_request() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(Arc::clone(&storage))).await;
    let member_id = register(&app, "ada@example.org", "Ada").await;
    activate(&storage, member_id).await;
    let secretary = register(&app, "sec@example.org", "Secretary").await;
    make_secretary(&storage, secretary).await;
    let cookie = login(&app, "ada@example.org").await;

    let before = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/members/{member_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(before.status(), StatusCode::OK);

    let secretary_cookie = login(&app, "sec@example.org").await;
    let ban = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/members/{member_id}/ban"))
            .cookie(secretary_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(ban.status(), StatusCode::OK);

    // The banned member's session cookie is still live; the guard is not.
    let after = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/members/{member_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(after.status(), StatusCode::FORBIDDEN);
}

/// The secretary role grants nothing while the membership is not active.
/// Both the secretary gate and the active-membership gate must refuse.
#[rstest]
#[case::pending(MemberStatus::Pending)]
#[case::rejected(MemberStatus::Rejected)]
#[case::banned(MemberStatus::Banned)]
#[actix_web::test]
async fn a_secretary_role_without_active_status_grants_no_access(
    #[case] status: MemberStatus,
) {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(Arc::clone(&storage))).await;
    let holder = register(&app, "sec@example.org", "Holder").await;
    let applicant = register(&app, "ada@example.org", "Ada").await;
    storage
        .update_member(
            MemberId::from_uuid(holder),
            MemberUpdate {
                role: Some(MemberRole::Secretary),
                status: Some(status),
                ..MemberUpdate::default()
            },
        )
        .await
        .expect("role and status update succeeds");
    let cookie = login(&app, "sec@example.org").await;

    let approve = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/members/{applicant}/approve"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(approve.status(), StatusCode::FORBIDDEN, "{status}");

    let profile = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/members/{holder}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(profile.status(), StatusCode::FORBIDDEN, "{status}");
}

#[actix_web::test]
async fn plain_members_cannot_use_secretary_endpoints() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(Arc::clone(&storage))).await;
    let member_id = register(&app, "ada@example.org", "Ada").await;
    activate(&storage, member_id).await;
    let other = register(&app, "bola@example.org", "Bola").await;
    let cookie = login(&app, "ada@example.org").await;

    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/members/{other}/approve"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn the_member_listing_is_public_and_filterable() {
    let storage = Arc::new(MemoryStorage::default());
    let app = test::init_service(test_app(Arc::clone(&storage))).await;
    let active = register(&app, "bola@example.org", "Bola").await;
    activate(&storage, active).await;
    register(&app, "ada@example.org", "Ada").await;

    // No session cookie on either request.
    let directory = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/members").to_request(),
    )
    .await;
    assert_eq!(directory.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(directory).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["fullName"], "Bola");

    let pending = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/members?status=pending")
            .to_request(),
    )
    .await;
    assert_eq!(pending.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(pending).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["fullName"], "Ada");

    let bad = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/members?status=imaginary")
            .to_request(),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}
