//! Row models bridging the Diesel schema and the domain types.
//!
//! Status and role labels are strict: an unknown label is data corruption and
//! fails the query. Office and position labels are lenient: unknown values
//! log a warning and fall back to the bottom of their hierarchy so one bad
//! row cannot take the member list down.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::domain::content::{ContentId, ContentKind, ContentRecord};
use crate::domain::member::{
    CouncilOffice, FullName, Member, MemberId, MemberRole, MemberStatus, MemberUpdate,
    MowcubPosition, StateshipYear,
};
use crate::domain::ports::StorageError;
use crate::domain::user::{Email, User, UserId};

use super::schema::{content_items, members, users};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(&row.email).map_err(|err| {
            StorageError::query(format!("user {} has an invalid email: {err}", row.id))
        })?;
        Ok(User {
            id: UserId::from_uuid(row.id),
            email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MemberRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub nickname: Option<String>,
    pub stateship_year: String,
    pub last_mowcub_position: String,
    pub current_council_office: String,
    pub status: String,
    pub role: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = members)]
pub struct NewMemberRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub nickname: Option<String>,
    pub stateship_year: String,
    pub last_mowcub_position: String,
    pub current_council_office: String,
    pub status: String,
    pub role: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
}

/// Partial member update; `None` fields are skipped by Diesel.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = members)]
pub struct MemberChangeset {
    pub full_name: Option<String>,
    pub nickname: Option<String>,
    pub stateship_year: Option<String>,
    pub last_mowcub_position: Option<String>,
    pub current_council_office: Option<String>,
    pub status: Option<String>,
    pub role: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberUpdate> for MemberChangeset {
    fn from(update: MemberUpdate) -> Self {
        Self {
            full_name: update.full_name.map(String::from),
            nickname: update.nickname,
            stateship_year: update.stateship_year.map(String::from),
            last_mowcub_position: update
                .last_mowcub_position
                .map(|value| value.label().to_owned()),
            current_council_office: update
                .current_council_office
                .map(|value| value.label().to_owned()),
            status: update.status.map(|value| value.label().to_owned()),
            role: update.role.map(|value| value.label().to_owned()),
            latitude: update.latitude,
            longitude: update.longitude,
            photo_url: update.photo_url,
            dues_proof_url: update.dues_proof_url,
            approved_at: update.approved_at,
            updated_at: Utc::now(),
        }
    }
}

/// Lenient office parse: unknown labels sort last instead of failing.
fn office_from_label(label: &str, member_id: Uuid) -> CouncilOffice {
    CouncilOffice::parse_label(label).unwrap_or_else(|| {
        warn!(
            value = label,
            member_id = %member_id,
            "unrecognised council office label, treating as no office"
        );
        CouncilOffice::None
    })
}

/// Lenient position parse: unknown labels sort last instead of failing.
fn position_from_label(label: &str, member_id: Uuid) -> MowcubPosition {
    MowcubPosition::parse_label(label).unwrap_or_else(|| {
        warn!(
            value = label,
            member_id = %member_id,
            "unrecognised position label, treating as the lowest rank"
        );
        MowcubPosition::Private
    })
}

impl TryFrom<MemberRow> for Member {
    type Error = StorageError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let status = MemberStatus::parse_label(&row.status).ok_or_else(|| {
            StorageError::query(format!(
                "member {} has unknown status label {:?}",
                row.id, row.status
            ))
        })?;
        let role = MemberRole::parse_label(&row.role).ok_or_else(|| {
            StorageError::query(format!(
                "member {} has unknown role label {:?}",
                row.id, row.role
            ))
        })?;
        let full_name = FullName::new(&row.full_name).map_err(|err| {
            StorageError::query(format!("member {} has an invalid name: {err}", row.id))
        })?;
        let stateship_year = StateshipYear::new(&row.stateship_year).map_err(|err| {
            StorageError::query(format!(
                "member {} has an invalid stateship year: {err}",
                row.id
            ))
        })?;
        Ok(Member {
            id: MemberId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            full_name,
            nickname: row.nickname,
            stateship_year,
            last_mowcub_position: position_from_label(&row.last_mowcub_position, row.id),
            current_council_office: office_from_label(&row.current_council_office, row.id),
            status,
            role,
            latitude: row.latitude,
            longitude: row.longitude,
            photo_url: row.photo_url,
            dues_proof_url: row.dues_proof_url,
            approved_at: row.approved_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = content_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContentRow {
    pub id: Uuid,
    pub kind: String,
    pub author: Uuid,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = content_items)]
pub struct NewContentRow {
    pub id: Uuid,
    pub kind: String,
    pub author: Uuid,
    pub payload: Value,
}

impl TryFrom<ContentRow> for ContentRecord {
    type Error = StorageError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let kind = ContentKind::parse_label(&row.kind).ok_or_else(|| {
            StorageError::query(format!(
                "content {} has unknown kind label {:?}",
                row.id, row.kind
            ))
        })?;
        Ok(ContentRecord {
            id: ContentId::from_uuid(row.id),
            kind,
            author: MemberId::from_uuid(row.author),
            payload: row.payload,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn member_row(status: &str, role: &str, office: &str, position: &str) -> MemberRow {
        MemberRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: "Ada Lovelace".to_owned(),
            nickname: None,
            stateship_year: "2019/2020".to_owned(),
            last_mowcub_position: position.to_owned(),
            current_council_office: office.to_owned(),
            status: status.to_owned(),
            role: role.to_owned(),
            latitude: None,
            longitude: None,
            photo_url: None,
            dues_proof_url: None,
            approved_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn valid_row_converts() {
        let member =
            Member::try_from(member_row("active", "secretary", "president", "colonel"))
                .expect("valid row converts");
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.role, MemberRole::Secretary);
        assert_eq!(member.current_council_office, CouncilOffice::President);
        assert_eq!(member.last_mowcub_position, MowcubPosition::Colonel);
    }

    #[rstest]
    #[case("suspended", "member")]
    #[case("active", "chairman")]
    fn unknown_status_or_role_fails_the_conversion(#[case] status: &str, #[case] role: &str) {
        let err = Member::try_from(member_row(status, role, "none", "private"))
            .expect_err("unknown labels must fail");
        assert!(matches!(err, StorageError::Query(_)));
    }

    #[rstest]
    fn unknown_office_and_position_fall_back_instead_of_failing() {
        let member = Member::try_from(member_row("active", "member", "grand_vizier", "cadet"))
            .expect("lenient labels convert");
        assert_eq!(member.current_council_office, CouncilOffice::None);
        assert_eq!(member.last_mowcub_position, MowcubPosition::Private);
    }

    #[rstest]
    fn empty_update_still_touches_updated_at() {
        let changeset = MemberChangeset::from(MemberUpdate::default());
        assert!(changeset.status.is_none());
        assert!(changeset.approved_at.is_none());
    }
}
