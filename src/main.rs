mod api;
mod export;
mod normalize;
mod pipeline;
mod sentiment;
mod video;
mod youtube;

use axum::{
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::pipeline::Analyzer;
use crate::sentiment::SentimentClassifier;
use crate::youtube::YouTubeClient;

#[derive(OpenApi)]
#[openapi(
    paths(api::analyze, api::export_csv, api::health),
    components(
        schemas(
            api::AnalyzeRequest,
            api::ErrorResponse,
            api::HealthResponse,
            crate::pipeline::ResultSet,
            crate::pipeline::ClassifiedComment,
            crate::pipeline::LabelCounts,
            crate::pipeline::LabelBuckets,
            crate::pipeline::Percentages,
            crate::pipeline::KeywordCount,
            crate::sentiment::SentimentLabel,
            crate::youtube::RawComment
        )
    ),
    tags(
        (name = "analysis", description = "Comment Sentiment Analysis API")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let api_key = env::var("YOUTUBE_API_KEY").expect("YOUTUBE_API_KEY must be set");
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let state = Arc::new(api::AppState {
        analyzer: Analyzer::new(SentimentClassifier::with_default_lexicon()),
        youtube: YouTubeClient::new(api_key),
    });

    let app = Router::new()
        .merge(SwaggerUi::new("/sentiment-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/analyze", post(api::analyze))
        .route("/analyze/export", post(api::export_csv))
        .route("/health", get(api::health))
        .nest_service("/", ServeDir::new("static")) // Serve Dashboard
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Swagger UI mounted at /sentiment-swagger");
    println!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
