//! Fixture prediction server. Speaks the same multipart/JSON contract as the
//! real classifier but answers from the advisory catalogue without running a model.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{DiseaseInfo, MAX_IMAGE_BYTES},
    error::{ApiError, ErrorCode},
    protocol::PredictResponse,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

mod catalog;
mod config;

use config::{load_settings, Settings};

#[derive(Clone)]
struct AppState {
    settings: Settings,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn api_error(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError::new(code, message)))
}

fn multipart_error(err: MultipartError) -> (StatusCode, Json<ApiError>) {
    let status = err.status();
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorCode::PayloadTooLarge
    } else {
        ErrorCode::Validation
    };
    warn!(%status, error = %err.body_text(), "rejected multipart body");
    api_error(status, code, err.body_text())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let addr: SocketAddr = settings.server_bind.parse()?;
    let app = build_router(Arc::new(AppState { settings }));

    info!(%addr, "fixture prediction server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/upload", post(predict))
        .route("/predict", post(predict))
        .route("/disease-info/:disease_name", get(http_disease_info))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_IMAGE_BYTES as usize))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn predict(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<PredictResponse> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            ErrorCode::Validation,
            "No file provided",
        ));
    };
    if filename.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            ErrorCode::Validation,
            "No file selected",
        ));
    }
    let Some(media_type) = catalog::allowed_media_type(&filename) else {
        warn!(%filename, "rejected upload with unsupported extension");
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            ErrorCode::Validation,
            "Invalid file type",
        ));
    };
    if bytes.is_empty() {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            "Failed to process image",
        ));
    }

    let label = catalog::pick_label(state.settings.stub_label.as_deref(), &bytes);
    let info = catalog::disease_info(label).unwrap_or_default();
    info!(
        %filename,
        %media_type,
        size_bytes = bytes.len(),
        prediction = label,
        "answered prediction"
    );
    Ok(Json(PredictResponse::classified(
        label,
        state.settings.stub_confidence,
        info,
    )))
}

async fn http_disease_info(Path(disease_name): Path<String>) -> ApiResult<DiseaseInfo> {
    catalog::disease_info(&disease_name)
        .map(Json)
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                "Disease not found",
            )
        })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
