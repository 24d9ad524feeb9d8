//! Membership API handlers.
//!
//! ```text
//! GET   /api/v1/members?status=pending
//! GET   /api/v1/members/{id}
//! PATCH /api/v1/members/{id}/approve
//! PATCH /api/v1/members/{id}/reject
//! PATCH /api/v1/members/{id}/ban
//! POST  /api/v1/members/handover {"to":"<member id>"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::member::{Member, MemberFilter, MemberId, MemberStatus};
use crate::domain::ports::MemberStore;
use crate::domain::ranking::rank;
use crate::inbound::http::ApiResult;
use crate::inbound::http::guards::{ActiveMember, Secretary};
use crate::inbound::http::state::HttpState;

/// Query string for the member listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberListQuery {
    pub status: Option<String>,
}

/// Body for `POST /api/v1/members/handover`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HandoverRequest {
    /// Member id of the incoming secretary.
    #[schema(value_type = String)]
    pub to: Uuid,
}

/// List members. The active directory is ranked by office, seniority, and
/// prior rank; other status filters keep the port's newest-first order.
#[utoipa::path(
    get,
    path = "/api/v1/members",
    params(
        ("status" = Option<String>, Query, description = "Filter by lifecycle status")
    ),
    responses(
        (status = 200, description = "Members in directory order", body = [Member]),
        (status = 400, description = "Unknown status value", body = DomainError),
        (status = 503, description = "Storage unavailable", body = DomainError)
    ),
    tags = ["members"],
    operation_id = "listMembers",
    security([])
)]
#[get("/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
    query: web::Query<MemberListQuery>,
) -> ApiResult<web::Json<Vec<Member>>> {
    let status = match query.status.as_deref() {
        None => MemberStatus::Active,
        Some(raw) => MemberStatus::parse_label(raw).ok_or_else(|| {
            DomainError::invalid_request(format!("unknown member status {raw:?}"))
        })?,
    };
    let members = state
        .storage
        .list_members(MemberFilter::with_status(status))
        .await
        .map_err(DomainError::from)?;
    let members = if status == MemberStatus::Active {
        rank(members)
    } else {
        members
    };
    Ok(web::Json(members))
}

/// Fetch one member profile. Reserved for active members.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}",
    params(("id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Member profile", body = Member),
        (status = 401, description = "No active session", body = DomainError),
        (status = 403, description = "Membership not active", body = DomainError),
        (status = 404, description = "Member not found", body = DomainError),
        (status = 503, description = "Storage unavailable", body = DomainError)
    ),
    tags = ["members"],
    operation_id = "getMember"
)]
#[get("/members/{id}")]
pub async fn get_member(
    state: web::Data<HttpState>,
    _caller: ActiveMember,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Member>> {
    let id = MemberId::from_uuid(path.into_inner());
    let member = state
        .storage
        .find_member(id)
        .await
        .map_err(DomainError::from)?
        .ok_or_else(|| DomainError::not_found(format!("member {id} not found")))?;
    Ok(web::Json(member))
}

/// Approve a pending member.
#[utoipa::path(
    patch,
    path = "/api/v1/members/{id}/approve",
    params(("id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Member approved", body = Member),
        (status = 401, description = "No active session", body = DomainError),
        (status = 403, description = "Secretary role required", body = DomainError),
        (status = 404, description = "Member not found", body = DomainError),
        (status = 409, description = "Illegal lifecycle transition", body = DomainError)
    ),
    tags = ["members"],
    operation_id = "approveMember"
)]
#[patch("/members/{id}/approve")]
pub async fn approve_member(
    state: web::Data<HttpState>,
    _caller: Secretary,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Member>> {
    let member = state
        .membership
        .approve(MemberId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(member))
}

/// Reject a pending member.
#[utoipa::path(
    patch,
    path = "/api/v1/members/{id}/reject",
    params(("id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Member rejected", body = Member),
        (status = 401, description = "No active session", body = DomainError),
        (status = 403, description = "Secretary role required", body = DomainError),
        (status = 404, description = "Member not found", body = DomainError),
        (status = 409, description = "Illegal lifecycle transition", body = DomainError)
    ),
    tags = ["members"],
    operation_id = "rejectMember"
)]
#[patch("/members/{id}/reject")]
pub async fn reject_member(
    state: web::Data<HttpState>,
    _caller: Secretary,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Member>> {
    let member = state
        .membership
        .reject(MemberId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(member))
}

/// Ban an active member. Live sessions lose access at the next guard check.
#[utoipa::path(
    patch,
    path = "/api/v1/members/{id}/ban",
    params(("id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Member banned", body = Member),
        (status = 401, description = "No active session", body = DomainError),
        (status = 403, description = "Secretary role required", body = DomainError),
        (status = 404, description = "Member not found", body = DomainError),
        (status = 409, description = "Illegal lifecycle transition", body = DomainError)
    ),
    tags = ["members"],
    operation_id = "banMember"
)]
#[patch("/members/{id}/ban")]
pub async fn ban_member(
    state: web::Data<HttpState>,
    _caller: Secretary,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Member>> {
    let member = state
        .membership
        .ban(MemberId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(member))
}

/// Hand the secretary role to another active member.
#[utoipa::path(
    post,
    path = "/api/v1/members/handover",
    request_body = HandoverRequest,
    responses(
        (status = 204, description = "Role transferred"),
        (status = 400, description = "Invalid request", body = DomainError),
        (status = 401, description = "No active session", body = DomainError),
        (status = 403, description = "Secretary role required", body = DomainError),
        (status = 404, description = "Member not found", body = DomainError),
        (status = 409, description = "Incoming member not active", body = DomainError)
    ),
    tags = ["members"],
    operation_id = "handoverSecretary"
)]
#[post("/members/handover")]
pub async fn handover_secretary(
    state: web::Data<HttpState>,
    caller: Secretary,
    payload: web::Json<HandoverRequest>,
) -> ApiResult<HttpResponse> {
    let from = caller.0.member.id;
    let to = MemberId::from_uuid(payload.into_inner().to);
    state.membership.handover(from, to).await?;
    Ok(HttpResponse::NoContent().finish())
}
