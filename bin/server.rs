// AccuCheck - Web Server
// REST API with Axum: upload a ledger, get a review report back

use accucheck::{summarizer_from_config, Config, Pipeline, Report, ReviewError, SourceFormat, Summarizer};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(version, about = "AccuCheck review API")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000", env = "ACCUCHECK_ADDR")]
    addr: String,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    summarizer: Arc<dyn Summarizer>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Deserialize)]
struct ReviewParams {
    /// File extension of the upload: csv, tsv, xlsx, ...
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/review?format=csv - Review the uploaded file (raw body)
async fn review_upload(
    State(state): State<AppState>,
    Query(params): Query<ReviewParams>,
    body: Bytes,
) -> Response {
    let format = match SourceFormat::from_extension(&params.format) {
        Ok(format) => format,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let summarizer = state.summarizer.clone();
    let result = tokio::task::spawn_blocking(move || {
        Pipeline::new(summarizer.as_ref()).review_bytes(&body, format)
    })
    .await;

    match result {
        Ok(Ok(report)) => (StatusCode::OK, Json(ApiResponse::<Report>::ok(report))).into_response(),
        Ok(Err(e @ ReviewError::MissingValueColumn { .. })) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Ok(Err(e)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            error!("Review task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Review task failed".to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponse::<Report>::err(message))).into_response()
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/review", post(review_upload))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accucheck=info,accucheck_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    // Blocking HTTP client must be built outside the async runtime
    let summarizer: Arc<dyn Summarizer> =
        Arc::from(summarizer_from_config(&config).context("Failed to set up summarizer")?);
    info!(summarizer = config.summarizer_enabled(), "configuration loaded");

    let state = AppState { summarizer };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    runtime.block_on(serve(&args.addr, state))
}

async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("API: POST http://{}/api/review?format=csv", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use accucheck::NoopSummarizer;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState { summarizer: Arc::new(NoopSummarizer) })
    }

    async fn call(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn upload(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = call(Request::get("/api/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], "OK");
    }

    #[tokio::test]
    async fn test_review_csv_upload() {
        let (status, json) = call(upload(
            "/api/review?format=csv",
            "Akun,Jenis Akun,Nilai\nPendapatan Jasa,Pendapatan,1000\nKas,Liabilitas,500\n",
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["aggregate"][0]["classification"], "Pendapatan");
        assert_eq!(json["data"]["findings"][0]["rule_id"], "cash_not_asset");
    }

    #[tokio::test]
    async fn test_missing_value_column_is_unprocessable() {
        let (status, json) = call(upload("/api/review", "Akun,Jenis Akun\nKas,Aset\n")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("No value column"));
    }

    #[tokio::test]
    async fn test_unknown_format_rejected() {
        let (status, _) = call(upload("/api/review?format=pdf", "x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
