//! Application startup and lifecycle management.

use crate::config::{StorageBackend, TempleConfig};
use crate::handlers::{self, account, directory, payments, receipts, reports, roles};
use crate::services::{
    init_metrics, AccessControl, DirectoryService, DonationService, InMemoryRepository,
    PgRepository, Store,
};
use axum::middleware::from_fn;
use axum::{
    routing::{get, post, put},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: TempleConfig,
    pub store: Arc<dyn Store>,
    pub donations: DonationService,
    pub directory: DirectoryService,
    pub access: AccessControl,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: TempleConfig) -> Result<Self, AppError> {
        init_metrics();

        let store = connect_store(&config).await?;

        let access = AccessControl::new(store.clone());
        access
            .bootstrap_admins(&config.admin_principals)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign bootstrap admins: {}", e);
                AppError::from(e)
            })?;

        let state = AppState {
            donations: DonationService::new(store.clone(), config.issuer.clone()),
            directory: DirectoryService::new(store.clone()),
            access,
            store,
            config: config.clone(),
        };

        let router = build_router(state);

        // Bind listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            storage = ?config.storage,
            "Temple service listening"
        );

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}

async fn connect_store(config: &TempleConfig) -> Result<Arc<dyn Store>, AppError> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage: data is lost on restart");
            Ok(Arc::new(InMemoryRepository::new(config.initial_balance)))
        }
        StorageBackend::Postgres => {
            let db = config.database.as_ref().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "DATABASE_URL is required for the postgres storage backend"
                ))
            })?;

            let repository =
                PgRepository::connect(db.url.expose_secret(), db.max_connections, db.min_connections)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to PostgreSQL: {}", e);
                        AppError::from(e)
                    })?;
            repository.run_migrations().await?;
            repository.ensure_account(config.initial_balance).await?;

            Ok(Arc::new(repository))
        }
    }
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        // Payment workflow
        .route("/payments", post(payments::submit_payment))
        .route("/payments/pending", get(payments::list_pending))
        .route("/payments/:id", put(payments::edit_payment))
        .route("/payments/:id/approve", post(payments::approve_payment))
        .route("/payments/:id/reject", post(payments::reject_payment))
        .route("/receipts/:number", get(receipts::get_receipt))
        .route(
            "/receipts/:number/regenerate",
            post(receipts::regenerate_receipt),
        )
        .route("/receipts/:number/cancel", post(receipts::cancel_receipt))
        .route("/account", get(account::get_account))
        .route("/account/balance", put(account::adjust_balance))
        .route("/reports/donations", get(reports::donation_report))
        .route("/reports/donors", get(reports::donor_list))
        // Access control
        .route("/me/role", get(roles::get_my_role))
        .route("/me/is-admin", get(roles::is_admin))
        .route("/roles/:principal", put(roles::assign_role))
        // Temple directory
        .route(
            "/committee",
            get(directory::list_committee).post(directory::add_committee_member),
        )
        .route("/committee/admin", get(directory::list_committee_admin))
        .route(
            "/committee/:id",
            put(directory::edit_committee_member).delete(directory::remove_committee_member),
        )
        .route(
            "/contacts",
            get(directory::list_contacts).post(directory::add_contact),
        )
        .route(
            "/contacts/:id",
            put(directory::edit_contact).delete(directory::remove_contact),
        )
        .route(
            "/jatres",
            get(directory::list_jatres).post(directory::add_jatre),
        )
        .route(
            "/jatres/:id",
            put(directory::edit_jatre).delete(directory::remove_jatre),
        )
        .route(
            "/gallery",
            get(directory::list_gallery).post(directory::add_gallery_item),
        )
        .route(
            "/gallery/:id",
            put(directory::edit_gallery_item).delete(directory::remove_gallery_item),
        )
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request_id(request.headers()).unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
