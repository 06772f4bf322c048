pub mod analysis_routes;
pub mod config;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analysis_pipeline::AnalysisPipeline;
use news_sentiment::LexiconSentimentScorer;
use newsapi_client::NewsApiClient;
use valuation_core::ValuationError;
use yahoo_client::YahooFinanceClient;

pub use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
}

/// Standard response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP-facing error. The body always carries the failure description so the
/// caller can show a user-visible message.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Valuation(ValuationError),
}

impl From<ValuationError> for AppError {
    fn from(err: ValuationError) -> Self {
        AppError::Valuation(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Valuation(err) => {
                let status = match err {
                    // Upstream feed failed or returned nothing
                    ValuationError::DataUnavailable(_) => StatusCode::BAD_GATEWAY,
                    // The ticker's data cannot support the computation
                    ValuationError::InsufficientData(_)
                    | ValuationError::MissingField(_)
                    | ValuationError::DivisionByZero(_)
                    | ValuationError::InvalidRate(_) => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, err.to_string())
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(analysis_routes::analysis_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let market_data = Arc::new(YahooFinanceClient::new(config.http_timeout));
    let news = Arc::new(NewsApiClient::new(
        config.newsapi_key.clone(),
        config.http_timeout,
    ));
    let scorer = Arc::new(LexiconSentimentScorer::new());

    let pipeline = Arc::new(AnalysisPipeline::new(market_data, news, scorer));
    let state = AppState { pipeline };

    let app = build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
}
