use recauda::api::handlers::api_routes;
use recauda::api::openapi::ApiDoc;
use recauda::client::http::HttpCollectApi;
use recauda::config::CONFIG;
use recauda::service::RecaudaService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(CONFIG.log_level.as_str())
        .init();

    // Wire the workflow service to the real backend
    let api = HttpCollectApi::new(CONFIG.backend_url.clone());
    let service = Arc::new(RecaudaService::new(api, CONFIG.jwt_secret.clone()));

    let app = axum::Router::new()
        // add / route with a simple health check
        .route("/", axum::routing::get(|| async { "OK" }))
        .merge(api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Console running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
