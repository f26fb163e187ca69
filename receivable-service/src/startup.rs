//! Application startup and lifecycle management.

use crate::config::ReceivableConfig;
use crate::handlers::health::{health_check, metrics_handler, readiness_check};
use crate::handlers::invoices::{
    create_invoice, delete_invoice, export_invoices, get_invoice, list_invoices, settle_invoice,
    update_invoice,
};
use crate::services::{
    init_metrics, AggregateCache, Database, HttpDirectoryClient, HttpNotifier, HttpRenderer,
    InvoiceStore, ReceivableService, RedisCache,
};
use crate::workers::AggregateRefresher;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ReceivableConfig,
    pub db: Arc<Database>,
    pub receivables: Arc<ReceivableService>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    store: Arc<dyn InvoiceStore>,
    cache: Arc<dyn AggregateCache>,
    shutdown: CancellationToken,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ReceivableConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build the application without running migrations.
    /// Use this in tests when migrations are already applied by the test harness.
    pub async fn build_without_migrations(config: ReceivableConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(
        config: ReceivableConfig,
        run_migrations: bool,
    ) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        if run_migrations {
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                e
            })?;
        }

        let db = Arc::new(db);

        let cache: Arc<dyn AggregateCache> =
            Arc::new(RedisCache::new(&config.redis.url).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to Redis");
                AppError::InternalError(e)
            })?);

        let store: Arc<dyn InvoiceStore> = db.clone();
        let receivables = Arc::new(ReceivableService::new(
            store.clone(),
            Arc::new(HttpRenderer::new(&config.renderer.url)),
            Arc::new(HttpDirectoryClient::new(&config.directory.url)),
            Arc::new(HttpNotifier::new(&config.notifier.url)),
        ));

        let state = AppState {
            config: config.clone(),
            db,
            receivables,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Receivable service listener bound");

        Ok(Self {
            port,
            listener,
            state,
            store,
            cache,
            shutdown: CancellationToken::new(),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        // Background aggregate refresh, independent of request handling.
        AggregateRefresher::new(
            self.store.clone(),
            self.cache.clone(),
            Duration::from_secs(self.state.config.cache_refresh_seconds),
            self.shutdown.child_token(),
        )
        .start();

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_handler))
            .route("/invoices", post(create_invoice).get(list_invoices))
            .route("/invoices/export", post(export_invoices))
            .route(
                "/invoices/:id",
                get(get_invoice).put(update_invoice).delete(delete_invoice),
            )
            .route("/invoices/:id/settlements", post(settle_invoice))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(self.state);

        tracing::info!(
            service = "receivable-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        let result = axum::serve(self.listener, router).await;

        self.shutdown.cancel();

        if let Err(e) = result {
            tracing::error!(error = %e, "HTTP server error");
            return Err(std::io::Error::other(format!("HTTP server error: {}", e)));
        }

        Ok(())
    }
}
