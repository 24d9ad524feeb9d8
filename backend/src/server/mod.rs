//! Server construction and middleware wiring.

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::Storage;
use crate::domain::session::SessionStore;
use crate::domain::{IdentityService, MembershipService};
use crate::inbound::http::auth::{login, logout, me, register};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::members::{
    approve_member, ban_member, get_member, handover_secretary, list_members, reject_member,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::managed::ManagedStorage;
use crate::outbound::memory::MemoryStorage;
use crate::outbound::persistence::{DbPool, DieselStorage, PoolConfig, run_migrations};

/// Which storage backend the boot selection settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
    Managed,
}

impl StorageBackend {
    pub fn label(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
            Self::Managed => "managed",
        }
    }
}

/// Pick a storage backend from the configuration.
///
/// `DATABASE_URL` wins over the managed backend; with neither configured the
/// server runs on volatile in-memory storage and says so loudly.
pub async fn select_storage(
    config: &AppConfig,
) -> std::io::Result<(Arc<dyn Storage>, StorageBackend)> {
    if let Some(database_url) = &config.database_url {
        run_migrations(database_url).map_err(std::io::Error::other)?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(std::io::Error::other)?;
        info!(backend = StorageBackend::Postgres.label(), "storage backend selected");
        return Ok((Arc::new(DieselStorage::new(pool)), StorageBackend::Postgres));
    }
    if let (Some(url), Some(key)) = (&config.managed_backend_url, &config.managed_backend_key) {
        let storage = ManagedStorage::new(url.clone(), key.clone()).map_err(std::io::Error::other)?;
        info!(backend = StorageBackend::Managed.label(), "storage backend selected");
        return Ok((Arc::new(storage), StorageBackend::Managed));
    }
    warn!("no persistent backend configured; using volatile in-memory storage");
    Ok((Arc::new(MemoryStorage::default()), StorageBackend::Memory))
}

/// Wire the domain services over the chosen backend.
pub fn build_http_state(storage: Arc<dyn Storage>, session_ttl_secs: i64) -> HttpState {
    let sessions = Arc::new(SessionStore::with_ttl_secs(session_ttl_secs));
    let identity = Arc::new(IdentityService::new(Arc::clone(&storage), sessions));
    let membership = Arc::new(MembershipService::new(Arc::clone(&storage)));
    HttpState::new(identity, membership, storage)
}

#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub key: Key,
    pub cookie_secure: bool,
}

/// Assemble the application: session middleware, API scope, and probes.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::hours(24)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(register)
        .service(login)
        .service(logout)
        .service(me)
        .service(list_members)
        .service(get_member)
        .service(approve_member)
        .service(reject_member)
        .service(ban_member)
        .service(handover_secretary);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct the HTTP server.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub async fn create_server(
    config: &AppConfig,
    key: Key,
) -> std::io::Result<(Server, web::Data<HealthState>)> {
    let (storage, _backend) = select_storage(config).await?;
    let http_state = web::Data::new(build_http_state(storage, config.session_ttl_secs));
    let health_state = web::Data::new(HealthState::default());

    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        key,
        cookie_secure: config.cookie_secure,
    };
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr)?
        .run();
    Ok((server, health_state))
}
