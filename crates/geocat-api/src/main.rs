use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use geocat_query::Catalog;
use geocat_search::{EsBackend, EsConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geocat_api::config::ApiConfig;
use geocat_api::routes::create_router;
use geocat_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geocat_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();

    tracing::info!(
        port = config.port,
        es_url = %config.es_url,
        index = %config.index,
        auth_enabled = config.api_key.is_some(),
        "Starting geocat API server"
    );

    let backend = EsBackend::new(EsConfig { url: config.es_url.clone(), ..Default::default() })
        .map_err(|e| anyhow::anyhow!("failed to initialize search backend: {e}"))?;

    let state = AppState::new(
        Catalog::new(Arc::new(backend)),
        config.index.clone(),
        config.page_limits.clone(),
        config.api_key.clone(),
    );

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-api-key")]),
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = create_router(state).layer(TraceLayer::new_for_http()).layer(cors);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
