//! Satellite content entities.
//!
//! News, forum threads, job posts, and the other community records share one
//! storage shape: a kind discriminator plus a JSON payload. The kind set is
//! closed; payloads are typed structs that serialise into the record, so the
//! port and its adapters stay uniform while handlers keep typed access.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::member::MemberId;

/// Stable content identifier stored as a UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(Uuid);

impl ContentId {
    /// Generate a new random [`ContentId`].
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

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Closed set of satellite content kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    NewsArticle,
    ForumThread,
    ForumReply,
    JobPost,
    MentorshipRequest,
    Notification,
    Event,
    Badge,
    HallOfFameEntry,
}

impl ContentKind {
    /// Stable wire/storage label for this kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::NewsArticle => "news_article",
            Self::ForumThread => "forum_thread",
            Self::ForumReply => "forum_reply",
            Self::JobPost => "job_post",
            Self::MentorshipRequest => "mentorship_request",
            Self::Notification => "notification",
            Self::Event => "event",
            Self::Badge => "badge",
            Self::HallOfFameEntry => "hall_of_fame_entry",
        }
    }

    /// Parse a storage label; unknown values are rejected, not defaulted.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "news_article" => Some(Self::NewsArticle),
            "forum_thread" => Some(Self::ForumThread),
            "forum_reply" => Some(Self::ForumReply),
            "job_post" => Some(Self::JobPost),
            "mentorship_request" => Some(Self::MentorshipRequest),
            "notification" => Some(Self::Notification),
            "event" => Some(Self::Event),
            "badge" => Some(Self::Badge),
            "hall_of_fame_entry" => Some(Self::HallOfFameEntry),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed payload that knows which [`ContentKind`] it belongs to.
pub trait ContentPayload: Serialize + DeserializeOwned {
    const KIND: ContentKind;
}

/// One stored content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[schema(value_type = String)]
    pub id: ContentId,
    pub kind: ContentKind,
    #[schema(value_type = String)]
    pub author: MemberId,
    #[schema(value_type = Object)]
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Deserialise the payload into its typed form.
    ///
    /// Fails with a conflict if the record's kind does not match `P::KIND`,
    /// and an internal error if the stored JSON no longer fits the type.
    pub fn payload_as<P: ContentPayload>(&self) -> Result<P, DomainError> {
        if self.kind != P::KIND {
            return Err(DomainError::conflict(format!(
                "content {} is a {}, not a {}",
                self.id,
                self.kind,
                P::KIND
            )));
        }
        serde_json::from_value(self.payload.clone()).map_err(|err| {
            DomainError::internal(format!(
                "stored {} payload failed to deserialise: {err}",
                self.kind
            ))
        })
    }
}

/// Draft for creating a [`ContentRecord`]; the adapter assigns id and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDraft {
    pub kind: ContentKind,
    pub author: MemberId,
    pub payload: Value,
}

impl ContentDraft {
    /// Build a draft from a typed payload.
    pub fn from_payload<P: ContentPayload>(
        author: MemberId,
        payload: &P,
    ) -> Result<Self, DomainError> {
        let payload = serde_json::to_value(payload).map_err(|err| {
            DomainError::internal(format!("{} payload failed to serialise: {err}", P::KIND))
        })?;
        Ok(Self {
            kind: P::KIND,
            author,
            payload,
        })
    }
}

/// Announcement published on the portal front page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub body: String,
}

impl ContentPayload for NewsArticle {
    const KIND: ContentKind = ContentKind::NewsArticle;
}

/// Discussion thread opened by a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForumThread {
    pub title: String,
    pub body: String,
}

impl ContentPayload for ForumThread {
    const KIND: ContentKind = ContentKind::ForumThread;
}

/// Reply within an existing forum thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForumReply {
    #[schema(value_type = String)]
    pub thread: ContentId,
    pub body: String,
}

impl ContentPayload for ForumReply {
    const KIND: ContentKind = ContentKind::ForumReply;
}

/// Job opening shared with the membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPost {
    pub title: String,
    pub company: String,
    pub description: String,
    pub contact: String,
}

impl ContentPayload for JobPost {
    const KIND: ContentKind = ContentKind::JobPost;
}

/// Request to be paired with a mentor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipRequest {
    pub topic: String,
    pub details: String,
}

impl ContentPayload for MentorshipRequest {
    const KIND: ContentKind = ContentKind::MentorshipRequest;
}

/// Notification delivered to one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[schema(value_type = String)]
    pub recipient: MemberId,
    pub message: String,
    pub read: bool,
}

impl ContentPayload for Notification {
    const KIND: ContentKind = ContentKind::Notification;
}

/// Calendar event visible to active members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: Option<String>,
}

impl ContentPayload for Event {
    const KIND: ContentKind = ContentKind::Event;
}

/// Badge awarded to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[schema(value_type = String)]
    pub recipient: MemberId,
    pub name: String,
    pub citation: Option<String>,
}

impl ContentPayload for Badge {
    const KIND: ContentKind = ContentKind::Badge;
}

/// Hall of fame entry honouring a member or cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HallOfFameEntry {
    pub honouree: String,
    pub citation: String,
}

impl ContentPayload for HallOfFameEntry {
    const KIND: ContentKind = ContentKind::HallOfFameEntry;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn record_for(draft: ContentDraft) -> ContentRecord {
        ContentRecord {
            id: ContentId::random(),
            kind: draft.kind,
            author: draft.author,
            payload: draft.payload,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn typed_payload_survives_the_record_shape() {
        let article = NewsArticle {
            title: "Convention dates announced".to_owned(),
            body: "The annual convention holds in December.".to_owned(),
        };
        let draft = ContentDraft::from_payload(MemberId::random(), &article)
            .expect("payload serialises");
        assert_eq!(draft.kind, ContentKind::NewsArticle);

        let record = record_for(draft);
        let round_tripped: NewsArticle = record.payload_as().expect("payload deserialises");
        assert_eq!(round_tripped, article);
    }

    #[rstest]
    fn payload_as_rejects_a_kind_mismatch() {
        let article = NewsArticle {
            title: "t".to_owned(),
            body: "b".to_owned(),
        };
        let draft = ContentDraft::from_payload(MemberId::random(), &article)
            .expect("payload serialises");
        let record = record_for(draft);
        let err = record
            .payload_as::<JobPost>()
            .expect_err("kind mismatch must fail");
        assert_eq!(err.code(), crate::domain::error::ErrorCode::Conflict);
    }

    #[rstest]
    #[case("news_article", Some(ContentKind::NewsArticle))]
    #[case("hall_of_fame_entry", Some(ContentKind::HallOfFameEntry))]
    #[case("classified_ad", None)]
    fn kind_labels_round_trip_and_reject_unknowns(
        #[case] label: &str,
        #[case] expected: Option<ContentKind>,
    ) {
        assert_eq!(ContentKind::parse_label(label), expected);
        if let Some(kind) = expected {
            assert_eq!(kind.label(), label);
        }
    }
}
