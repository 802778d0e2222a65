use std::fs;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::middleware;
use axum::{Router, extract::Request, response::Response};
use http::{HeaderValue, header};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::AppState;
use crate::core::{
    AppConfig,
    db::{async_db, migrate_db},
};

async fn set_static_cache_control(request: Request, next: middleware::Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    let static_path = shared_state
        .read()
        .expect("Unable to read share state")
        .config
        .static_path
        .clone();

    Router::new()
        .merge(routes::router())
        // Static assets for the client script
        .fallback_service(
            ServiceBuilder::new()
                .layer(middleware::from_fn(set_static_cache_control))
                .service(ServeDir::new(static_path)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Bring the schema up to date so a fresh checkout can serve
    // without running `init` first
    fs::create_dir_all(&config.db_path)?;
    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        migrate_db(conn)?;
        Ok(())
    })
    .await?;

    let app_state = AppState::new(db, config);
    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
