//! Managed-backend storage adapter.
//!
//! Delegates persistence to a hosted record service over HTTPS. Every call
//! carries the service key; transport failures and 5xx responses surface as
//! [`StorageError::Unavailable`] so an outage reads the same as a database
//! being down. The handover is two sequential writes here, unlike the
//! relational adapter's single transaction.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use crate::domain::content::{ContentDraft, ContentId, ContentKind, ContentRecord};
use crate::domain::member::{
    Member, MemberDraft, MemberFilter, MemberId, MemberRole, MemberUpdate,
};
use crate::domain::ports::{ContentStore, MemberStore, StorageError, UserStore};
use crate::domain::user::{Email, NewUser, User, UserId};

const SERVICE_KEY_HEADER: &str = "X-Service-Key";

/// Storage adapter backed by a hosted record service.
#[derive(Clone)]
pub struct ManagedStorage {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl ManagedStorage {
    /// Create an adapter for the service at `base_url`.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(base_url: Url, service_key: impl Into<String>) -> Result<Self, StorageError> {
        let client = Client::builder()
            .build()
            .map_err(|err| StorageError::unavailable(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            service_key: service_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StorageError> {
        self.base_url
            .join(path)
            .map_err(|err| StorageError::query(format!("invalid endpoint {path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, StorageError> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .query(query)
            .header(SERVICE_KEY_HEADER, &self.service_key)
            .send()
            .await
            .map_err(transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(decode(check(response).await?).await?))
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, StorageError> {
        let response = self
            .client
            .request(method, self.endpoint(path)?)
            .header(SERVICE_KEY_HEADER, &self.service_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(check(response).await?).await
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.endpoint(path)?)
            .header(SERVICE_KEY_HEADER, &self.service_key)
            .send()
            .await
            .map_err(transport_error)?;
        check(response).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> StorageError {
    StorageError::unavailable(err.to_string())
}

/// Translate non-success statuses into storage errors.
async fn check(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::CONFLICT => StorageError::duplicate_email(detail),
        StatusCode::NOT_FOUND => StorageError::not_found("managed record"),
        status if status.is_server_error() => {
            StorageError::unavailable(format!("managed backend returned {status}"))
        }
        status => StorageError::query(format!("managed backend returned {status}: {detail}")),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StorageError> {
    response
        .json()
        .await
        .map_err(|err| StorageError::query(format!("managed backend payload: {err}")))
}

#[async_trait]
impl UserStore for ManagedStorage {
    async fn create_user(&self, draft: NewUser) -> Result<User, StorageError> {
        let email = draft.email.as_ref().to_owned();
        self.send_json(reqwest::Method::POST, "users", &draft)
            .await
            .map_err(|err| match err {
                // The service signals a taken email with 409 and no body we
                // can rely on; restore the address for the caller.
                StorageError::DuplicateEmail(_) => StorageError::duplicate_email(email),
                other => other,
            })
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        self.get_json(&format!("users/{id}"), &[]).await
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        let users: Option<Vec<User>> =
            self.get_json("users", &[("email", email.as_ref())]).await?;
        Ok(users.and_then(|mut users| {
            if users.is_empty() {
                None
            } else {
                Some(users.remove(0))
            }
        }))
    }
}

#[async_trait]
impl MemberStore for ManagedStorage {
    async fn create_member(&self, draft: MemberDraft) -> Result<Member, StorageError> {
        self.send_json(reqwest::Method::POST, "members", &draft).await
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>, StorageError> {
        self.get_json(&format!("members/{id}"), &[]).await
    }

    async fn find_member_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Member>, StorageError> {
        let user_id = user_id.to_string();
        let members: Option<Vec<Member>> = self
            .get_json("members", &[("userId", user_id.as_str())])
            .await?;
        Ok(members.and_then(|mut members| {
            if members.is_empty() {
                None
            } else {
                Some(members.remove(0))
            }
        }))
    }

    async fn list_members(&self, filter: MemberFilter) -> Result<Vec<Member>, StorageError> {
        // The port contract is newest first; ask for it rather than relying
        // on the service's default order.
        let mut query = vec![("sort", "-createdAt")];
        if let Some(status) = filter.status {
            query.push(("status", status.label()));
        }
        let members: Option<Vec<Member>> = self.get_json("members", &query).await?;
        Ok(members.unwrap_or_default())
    }

    async fn update_member(
        &self,
        id: MemberId,
        update: MemberUpdate,
    ) -> Result<Member, StorageError> {
        self.send_json(reqwest::Method::PATCH, &format!("members/{id}"), &update)
            .await
    }

    async fn transfer_secretary(
        &self,
        from: MemberId,
        to: MemberId,
    ) -> Result<(), StorageError> {
        // Two writes with no transaction around them; if the second fails the
        // portal is briefly without a secretary until an operator intervenes.
        warn!(from = %from, to = %to, "secretary handover on the managed backend is not atomic");
        let demote = MemberUpdate {
            role: Some(MemberRole::Member),
            ..MemberUpdate::default()
        };
        let _: Member = self
            .send_json(reqwest::Method::PATCH, &format!("members/{from}"), &demote)
            .await?;
        let promote = MemberUpdate {
            role: Some(MemberRole::Secretary),
            ..MemberUpdate::default()
        };
        let _: Member = self
            .send_json(reqwest::Method::PATCH, &format!("members/{to}"), &promote)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for ManagedStorage {
    async fn create_content(&self, draft: ContentDraft) -> Result<ContentRecord, StorageError> {
        self.send_json(reqwest::Method::POST, "content", &draft).await
    }

    async fn find_content(
        &self,
        id: ContentId,
    ) -> Result<Option<ContentRecord>, StorageError> {
        self.get_json(&format!("content/{id}"), &[]).await
    }

    async fn list_content(
        &self,
        kind: ContentKind,
    ) -> Result<Vec<ContentRecord>, StorageError> {
        let records: Option<Vec<ContentRecord>> = self
            .get_json("content", &[("sort", "-createdAt"), ("kind", kind.label())])
            .await?;
        Ok(records.unwrap_or_default())
    }

    async fn delete_content(&self, id: ContentId) -> Result<(), StorageError> {
        self.delete(&format!("content/{id}")).await
    }
}
