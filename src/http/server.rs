//! # HTTP Server
//!
//! Wires the services into an Axum router under `/api/v1` and runs the
//! listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{OriginalUri, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::email::create_email_sender;
use crate::auth::{AuthService, InMemoryUserRepository};
use crate::observability::{log_event, Event};
use crate::services::{ReviewService, TourService};
use crate::store::DocumentStore;
use crate::uploads::UploadService;

use super::config::AppConfig;
use super::error::ApiError;
use super::review_routes::review_routes;
use super::tour_routes::tour_routes;
use super::user_routes::user_routes;

/// Shared application state
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub tours: TourService,
    pub reviews: ReviewService,
    pub auth: AuthService<InMemoryUserRepository>,
    pub uploads: UploadService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(DocumentStore::new());
        let email_sender = create_email_sender(config.email.clone());

        Self {
            tours: TourService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            auth: AuthService::new(
                InMemoryUserRepository::new(),
                config.jwt.clone(),
                email_sender,
            ),
            uploads: UploadService::new(config.upload_root.clone()),
            store,
            config,
        }
    }
}

/// HTTP server over the shared state
pub struct HttpServer {
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the full router.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .nest("/api/v1/tours", tour_routes(self.state.clone()))
            .nest("/api/v1/reviews", review_routes(self.state.clone()))
            .nest("/api/v1/users", user_routes(self.state.clone()))
            .fallback(route_not_found)
            .layer(middleware::from_fn(log_requests))
            .layer(cors)
    }

    /// Bind the listener and serve until shutdown.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .state
            .config
            .server
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{e}")))?;

        let router = self.router();
        let listener = TcpListener::bind(addr).await?;

        log_event(Event::ServerReady, &[("addr", &addr.to_string())]);
        axum::serve(listener, router).await?;

        log_event(Event::Shutdown, &[]);
        Ok(())
    }
}

/// One structured log line per finished request.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    log_event(
        Event::RequestComplete,
        &[
            ("method", &method),
            ("path", &path),
            ("status", &response.status().as_u16().to_string()),
        ],
    );
    response
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    log_event(Event::RouteNotFound, &[("path", uri.path())]);
    ApiError::RouteNotFound(uri.path().to_string())
}
