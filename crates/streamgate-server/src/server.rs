//! Router assembly, logging initialisation and the server lifecycle.

use crate::config::{AppConfig, LogFormat};
use crate::error::error_response;
use crate::middleware::{
    log_requests, RateLimitLayer, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
};
use crate::routes::{catalog, health, proxy, stream};
use crate::state::AppState;
use axum::http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use streamgate_core::ApiError;
use streamgate_upstream::UpstreamSource;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Does nothing if a subscriber
/// is already installed.
pub fn init_tracing(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(origin, "invalid CORS origin, allowing any");
                AllowOrigin::any()
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT, RANGE])
        .expose_headers([
            HeaderName::from_static(X_RATELIMIT_LIMIT),
            HeaderName::from_static(X_RATELIMIT_REMAINING),
            HeaderName::from_static(X_RATELIMIT_RESET),
            CONTENT_LENGTH,
            CONTENT_RANGE,
        ])
}

/// Renders a handler panic as an `INTERNAL_ERROR` envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = detail, "request handler panicked");
    error_response(ApiError::internal("internal server error"))
}

/// Builds the router.
///
/// `/health` is public. Everything under `/api/v1` passes the per-client
/// rate limiter. Middleware runs outermost first: trace, request log, panic
/// guard, CORS, rate limit.
///
/// The media proxy sits outside the CORS layer. It writes its own CORS
/// headers and answers `OPTIONS` itself.
pub fn build_router<U>(state: Arc<AppState<U>>) -> Router
where
    U: UpstreamSource<Error = ApiError> + 'static,
{
    let cors = cors_layer(&state.config.cors_origin);
    let limiter = RateLimitLayer::new(state.limiter.clone());

    let catalog = Router::new()
        .route("/search", get(catalog::search::<U>))
        .route("/anime/{id}", get(catalog::anime::<U>))
        .route("/episodes/{id}", get(catalog::episodes::<U>))
        .route("/servers", get(catalog::servers::<U>))
        .route("/stream", get(stream::stream::<U>))
        .route("/home", get(catalog::home::<U>))
        .layer(limiter.clone())
        .layer(cors.clone());

    let media = Router::new()
        .route(
            "/proxy",
            get(proxy::proxy::<U>).options(proxy::preflight),
        )
        .layer(limiter);

    Router::new()
        .route("/health", get(health::health_check::<U>))
        .layer(cors)
        .nest("/api/v1", catalog.merge(media))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `state` on `listener` until `shutdown` completes.
///
/// The cache and limiter sweepers run for exactly as long as the server.
pub async fn run<U, F>(listener: TcpListener, state: Arc<AppState<U>>, shutdown: F) -> anyhow::Result<()>
where
    U: UpstreamSource<Error = ApiError> + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let sweepers = state.spawn_sweepers();
    let app = build_router(state);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    for sweeper in sweepers {
        sweeper.stop();
    }
    Ok(())
}

/// Starts the server described by `config` and blocks until Ctrl+C or
/// SIGTERM.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::from_config(config)?);

    tracing::info!(
        upstream = %state.config.upstream_base_url,
        rate_limit = state.config.rate_limit,
        rate_window_ms = state.config.rate_window,
        retry_attempts = state.config.retry_attempts,
        "starting streamgate on {}",
        addr
    );

    let listener = TcpListener::bind(addr).await?;
    run(listener, state, shutdown_signal()).await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A signal handler that cannot be installed never fires; the other one
/// still does.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
