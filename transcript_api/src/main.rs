use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::{get, post},
};
use serde_json::json;
use std::net::SocketAddr;
use structs::AppState;
use tower_http::cors::CorsLayer;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::prelude::*;

mod captions;
mod handlers;
mod oembed;
mod structs;
mod transcripts;
mod video_id;

#[tokio::main]
async fn main() {
    init_tracer();

    let config = structs::load_config().expect("failed to load config");
    let state = AppState::new(config);

    serve(state).await;
}

fn init_tracer() {
    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

async fn serve(state: AppState) {
    // Set up a trace layer
    let trace_layer = TraceLayer::new_for_http().on_request(
        |request: &Request<Body>, _: &tracing::Span| {
            tracing::info!(
                "received request: {method} {uri}",
                method = request.method(),
                uri = request.uri()
            );
        },
    );

    let compression_layer = CompressionLayer::new().gzip(true).deflate(true);

    // The note-taking client calls in from whatever origin its app shell
    // uses, so CORS is wide open.
    let cors_layer = CorsLayer::permissive();

    let addr = SocketAddr::from((
        state
            .config
            .host
            .parse::<std::net::IpAddr>()
            .expect("HOST is not a valid IP address"),
        state.config.port,
    ));

    let app = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/transcript", post(handlers::transcript_handler))
        .route("/batch", post(handlers::batch_handler))
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "application/json")],
                Json(json!({
                    "message": "not found",
                })),
            )
        })
        .layer(trace_layer)
        .layer(compression_layer)
        .layer(cors_layer)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    tracing::info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server exited with an error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        )
        .expect("failed to install signal handler")
        .recv()
        .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::warn!("signal received, starting graceful shutdown");
}
