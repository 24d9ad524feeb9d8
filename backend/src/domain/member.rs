//! Member data model: the domain profile tied 1:1 to a credential `User`.
//!
//! Status and role are closed enumerations; unknown wire values are rejected
//! at deserialization rather than carried through comparisons as raw strings.
//! The council-office and prior-rank hierarchies used by the ranking engine
//! are encoded as precedence methods on their enums.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::UserId;

/// Validation errors returned by the member newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyFullName,
    FullNameTooLong { max: usize },
    EmptyStateshipYear,
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::FullNameTooLong { max } => {
                write!(f, "full name must be at most {max} characters")
            }
            Self::EmptyStateshipYear => write!(f, "stateship year must not be empty"),
        }
    }
}

impl std::error::Error for MemberValidationError {}

/// Stable member identifier stored as a UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
    /// Generate a new random [`MemberId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Maximum allowed length for a full name.
pub const FULL_NAME_MAX: usize = 100;

/// Member's full name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a [`FullName`] from owned input.
    pub fn new(name: impl Into<String>) -> Result<Self, MemberValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, MemberValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(MemberValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(MemberValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Cohort label identifying when a member's service term began, e.g.
/// `"2019/2020"`.
///
/// The raw label is preserved verbatim; [`StateshipYear::start_year`] parses
/// the leading integer for ordering. Malformed labels construct fine and sort
/// after every parsable cohort (documented fallback, never a crash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateshipYear(String);

impl StateshipYear {
    /// Validate and construct a [`StateshipYear`] from owned input.
    pub fn new(label: impl Into<String>) -> Result<Self, MemberValidationError> {
        Self::from_owned(label.into())
    }

    fn from_owned(label: String) -> Result<Self, MemberValidationError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(MemberValidationError::EmptyStateshipYear);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse the starting year of the cohort, e.g. `"2019/2020"` -> `2019`.
    pub fn start_year(&self) -> Option<u16> {
        let digits: String = self.0.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }

    /// Comparator key: the start year, or `u16::MAX` for unparsable labels so
    /// they sort after all parsable cohorts.
    pub fn sort_key(&self) -> u16 {
        self.start_year().unwrap_or(u16::MAX)
    }
}

impl AsRef<str> for StateshipYear {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StateshipYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<StateshipYear> for String {
    fn from(value: StateshipYear) -> Self {
        value.0
    }
}

impl TryFrom<String> for StateshipYear {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Lifecycle status of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Pending,
    Active,
    Rejected,
    Banned,
}

impl MemberStatus {
    /// Stable wire/storage label for this status.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Banned => "banned",
        }
    }

    /// Parse a storage label; unknown values are rejected, not defaulted.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "rejected" => Some(Self::Rejected),
            "banned" => Some(Self::Banned),
            _ => None,
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Application role of a member.
///
/// `Secretary` confers elevated privileges only while the member's status is
/// [`MemberStatus::Active`]; that conjunction is checked explicitly by the
/// authorization guards, never inferred from the role alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Member,
    Secretary,
}

impl MemberRole {
    /// Stable wire/storage label for this role.
    pub fn label(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Secretary => "secretary",
        }
    }

    /// Parse a storage label; unknown values are rejected, not defaulted.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "member" => Some(Self::Member),
            "secretary" => Some(Self::Secretary),
            _ => None,
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current council office held by a member, if any.
///
/// The fixed hierarchy table lives in [`CouncilOffice::precedence`]: the
/// president sorts before every other office, and plain members (`None`)
/// sort after every office holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CouncilOffice {
    President,
    VicePresident,
    GeneralSecretary,
    AssistantGeneralSecretary,
    Treasurer,
    FinancialSecretary,
    PublicRelationsOfficer,
    ProvostMarshal,
    #[default]
    None,
}

impl CouncilOffice {
    /// Comparison integer: President = 1, lower sorts first; `None` sorts
    /// after every office holder.
    pub fn precedence(self) -> u16 {
        match self {
            Self::President => 1,
            Self::VicePresident => 2,
            Self::GeneralSecretary => 3,
            Self::AssistantGeneralSecretary => 4,
            Self::Treasurer => 5,
            Self::FinancialSecretary => 6,
            Self::PublicRelationsOfficer => 7,
            Self::ProvostMarshal => 8,
            Self::None => u16::MAX,
        }
    }

    /// Stable wire/storage label for this office.
    pub fn label(self) -> &'static str {
        match self {
            Self::President => "president",
            Self::VicePresident => "vice_president",
            Self::GeneralSecretary => "general_secretary",
            Self::AssistantGeneralSecretary => "assistant_general_secretary",
            Self::Treasurer => "treasurer",
            Self::FinancialSecretary => "financial_secretary",
            Self::PublicRelationsOfficer => "public_relations_officer",
            Self::ProvostMarshal => "provost_marshal",
            Self::None => "none",
        }
    }

    /// Parse a storage label. Unknown labels return `None` so adapters can
    /// apply the documented warn-and-sort-last fallback.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "president" => Some(Self::President),
            "vice_president" => Some(Self::VicePresident),
            "general_secretary" => Some(Self::GeneralSecretary),
            "assistant_general_secretary" => Some(Self::AssistantGeneralSecretary),
            "treasurer" => Some(Self::Treasurer),
            "financial_secretary" => Some(Self::FinancialSecretary),
            "public_relations_officer" => Some(Self::PublicRelationsOfficer),
            "provost_marshal" => Some(Self::ProvostMarshal),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Last MOWCUB position held before stateship: the prior-rank hierarchy used
/// as the final ranking tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MowcubPosition {
    General,
    LieutenantGeneral,
    MajorGeneral,
    BrigadierGeneral,
    Colonel,
    LieutenantColonel,
    Major,
    Captain,
    Lieutenant,
    SecondLieutenant,
    WarrantOfficer,
    StaffSergeant,
    Sergeant,
    Corporal,
    LanceCorporal,
    Private,
}

impl MowcubPosition {
    /// Comparison integer: highest rank = 1, lower sorts first.
    pub fn precedence(self) -> u16 {
        match self {
            Self::General => 1,
            Self::LieutenantGeneral => 2,
            Self::MajorGeneral => 3,
            Self::BrigadierGeneral => 4,
            Self::Colonel => 5,
            Self::LieutenantColonel => 6,
            Self::Major => 7,
            Self::Captain => 8,
            Self::Lieutenant => 9,
            Self::SecondLieutenant => 10,
            Self::WarrantOfficer => 11,
            Self::StaffSergeant => 12,
            Self::Sergeant => 13,
            Self::Corporal => 14,
            Self::LanceCorporal => 15,
            Self::Private => 16,
        }
    }

    /// Stable wire/storage label for this position.
    pub fn label(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::LieutenantGeneral => "lieutenant_general",
            Self::MajorGeneral => "major_general",
            Self::BrigadierGeneral => "brigadier_general",
            Self::Colonel => "colonel",
            Self::LieutenantColonel => "lieutenant_colonel",
            Self::Major => "major",
            Self::Captain => "captain",
            Self::Lieutenant => "lieutenant",
            Self::SecondLieutenant => "second_lieutenant",
            Self::WarrantOfficer => "warrant_officer",
            Self::StaffSergeant => "staff_sergeant",
            Self::Sergeant => "sergeant",
            Self::Corporal => "corporal",
            Self::LanceCorporal => "lance_corporal",
            Self::Private => "private",
        }
    }

    /// Parse a storage label. Unknown labels return `None` so adapters can
    /// apply the documented warn-and-sort-last fallback.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "general" => Some(Self::General),
            "lieutenant_general" => Some(Self::LieutenantGeneral),
            "major_general" => Some(Self::MajorGeneral),
            "brigadier_general" => Some(Self::BrigadierGeneral),
            "colonel" => Some(Self::Colonel),
            "lieutenant_colonel" => Some(Self::LieutenantColonel),
            "major" => Some(Self::Major),
            "captain" => Some(Self::Captain),
            "lieutenant" => Some(Self::Lieutenant),
            "second_lieutenant" => Some(Self::SecondLieutenant),
            "warrant_officer" => Some(Self::WarrantOfficer),
            "staff_sergeant" => Some(Self::StaffSergeant),
            "sergeant" => Some(Self::Sergeant),
            "corporal" => Some(Self::Corporal),
            "lance_corporal" => Some(Self::LanceCorporal),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Domain profile of a portal member.
///
/// ## Invariants
/// - references exactly one [`crate::domain::user::User`] via `user_id`;
/// - created at [`MemberStatus::Pending`] / [`MemberRole::Member`] by the
///   registration path only;
/// - `approved_at` is set exactly once, on the pending -> active transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: MemberId,
    #[schema(value_type = String)]
    pub user_id: UserId,
    #[schema(value_type = String, example = "Ada Lovelace")]
    pub full_name: FullName,
    pub nickname: Option<String>,
    #[schema(value_type = String, example = "2019/2020")]
    pub stateship_year: StateshipYear,
    pub last_mowcub_position: MowcubPosition,
    #[serde(default)]
    pub current_council_office: CouncilOffice,
    pub status: MemberStatus,
    pub role: MemberRole,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Draft for creating a [`Member`].
///
/// Status and role are absent on purpose: the only creation path is
/// registration, which always produces a pending plain member. The adapter
/// assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub user_id: UserId,
    pub full_name: FullName,
    pub nickname: Option<String>,
    pub stateship_year: StateshipYear,
    pub last_mowcub_position: MowcubPosition,
    #[serde(default)]
    pub current_council_office: CouncilOffice,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
}

/// Partial update applied through the storage port. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub full_name: Option<FullName>,
    pub nickname: Option<String>,
    pub stateship_year: Option<StateshipYear>,
    pub last_mowcub_position: Option<MowcubPosition>,
    pub current_council_office: Option<CouncilOffice>,
    pub status: Option<MemberStatus>,
    pub role: Option<MemberRole>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Listing filter for the storage port's member queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberFilter {
    pub status: Option<MemberStatus>,
}

impl MemberFilter {
    /// Filter to a single status.
    pub fn with_status(status: MemberStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Whether a member matches this filter.
    pub fn matches(&self, member: &Member) -> bool {
        self.status.is_none_or(|status| member.status == status)
    }
}
