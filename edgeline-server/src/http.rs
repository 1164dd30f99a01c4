// HTTP routes for uploads, the gallery, and the headset exchange

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use edgeline_core::{Error, Store};
use edgeline_store::{list_artifacts, Mailbox, ProcessedReport};

// API state
#[derive(Clone)]
pub struct ApiState {
    pub mailbox: Arc<Mailbox>,
    pub max_upload_bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub store: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    pub status: String,
    pub filename: String,
    pub processed_path: String,
}

#[derive(Debug, Deserialize)]
pub struct OutboundQuery {
    pub img: String,
}

/// Build the service router.
pub fn create_router(state: ApiState) -> Router {
    let max_upload = state.max_upload_bytes as usize;

    let image_routes = Router::new()
        .route("/images/:store/gallery", get(gallery_handler))
        .route("/images/:store/data", get(data_folder_handler))
        .route("/images/:store/:filename", get(fetch_handler))
        .route("/images/:store", post(upload_handler));

    let exchange_routes = Router::new()
        .route("/exchange/outbound", get(exchange_outbound_handler))
        .route(
            "/exchange/inbound",
            get(exchange_consume_handler).post(exchange_deposit_handler),
        );

    Router::new()
        .route("/health", get(health_handler))
        .merge(image_routes)
        .merge(exchange_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a core error onto a status code and JSON body.
fn error_response(err: Error) -> Response {
    let (status, code) = match &err {
        Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Error::Processing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_ERROR"),
        Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        Error::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
    };
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn unknown_store(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("path type {:?} not found", name),
            code: "UNKNOWN_STORE".to_string(),
        }),
    )
        .into_response()
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = filename.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    if ext.eq_ignore_ascii_case("png") {
        "image/png"
    } else if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
        "image/jpeg"
    } else if ext.eq_ignore_ascii_case("gif") {
        "image/gif"
    } else {
        "application/octet-stream"
    }
}

/// Pull the `file` part out of a multipart body.
async fn read_file_part(mut multipart: Multipart) -> Result<(String, Vec<u8>), Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::Validation("No filename in file part".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Failed to read upload: {}", e)))?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(Error::Validation("No file part in request".to_string()))
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List the artifacts of a public store.
async fn gallery_handler(
    State(state): State<ApiState>,
    Path(store): Path<String>,
) -> Response {
    let Some(store) = Store::parse_public(&store) else {
        return unknown_store(&store);
    };
    match list_artifacts(state.mailbox.layout(), store) {
        Ok(artifacts) => Json(artifacts).into_response(),
        Err(e) => error_response(e),
    }
}

/// Upload a file into the raw or processed store.
async fn upload_handler(
    State(state): State<ApiState>,
    Path(store): Path<String>,
    multipart: Multipart,
) -> Response {
    let Some(store) = Store::parse_public(&store) else {
        return unknown_store(&store);
    };
    let (filename, bytes) = match read_file_part(multipart).await {
        Ok(part) => part,
        Err(e) => return error_response(e),
    };
    match edgeline_store::deposit(state.mailbox.layout(), store, &filename, &bytes) {
        Ok(stored) => {
            info!(store = %store, filename = %stored, "Upload accepted");
            Json(UploadResponse {
                status: "success".to_string(),
                store: store.to_string(),
                filename: stored,
            })
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Serve one artifact by exact name.
async fn fetch_handler(
    State(state): State<ApiState>,
    Path((store, filename)): Path<(String, String)>,
) -> Response {
    let Some(store) = Store::parse_public(&store) else {
        return unknown_store(&store);
    };
    match edgeline_store::fetch(state.mailbox.layout(), store, &filename) {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(&filename))],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Reserved alternate-representation folder; nothing lives here yet.
async fn data_folder_handler(Path(store): Path<String>) -> Response {
    if Store::parse_public(&store).is_none() {
        return unknown_store(&store);
    }
    (StatusCode::OK, "Data folder is currently empty.").into_response()
}

/// Headset pulls a finished mask by exact key.
async fn exchange_outbound_handler(
    State(state): State<ApiState>,
    Query(query): Query<OutboundQuery>,
) -> Response {
    match edgeline_store::fetch(state.mailbox.layout(), Store::Processed, &query.img) {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(&query.img))],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Headset drops a new source image into the exchange inbox.
async fn exchange_deposit_handler(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Response {
    let (filename, bytes) = match read_file_part(multipart).await {
        Ok(part) => part,
        Err(e) => return error_response(e),
    };
    match state.mailbox.deposit_inbox(&filename, &bytes) {
        Ok(stored) => {
            info!(filename = %stored, "Exchange deposit accepted");
            Json(UploadResponse {
                status: "success".to_string(),
                store: Store::ExchangeInbox.to_string(),
                filename: stored,
            })
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// One drain step over the exchange inbox.
///
/// Inference blocks, so the whole step runs on the blocking pool.
async fn exchange_consume_handler(State(state): State<ApiState>) -> Response {
    let mailbox = state.mailbox.clone();
    let result = tokio::task::spawn_blocking(move || mailbox.consume_inbox()).await;

    let report: Option<ProcessedReport> = match result {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => return error_response(e),
        Err(e) => {
            error!("Consume task panicked: {}", e);
            return error_response(Error::Processing("Inbox drain task failed".to_string()));
        }
    };

    match report {
        Some(report) => {
            let processed_path = format!("/images/processed/{}", report.processed);
            Json(ConsumeResponse {
                status: "success".to_string(),
                filename: report.source,
                processed_path,
            })
            .into_response()
        }
        None => {
            warn!("Exchange inbox polled while empty");
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "No new images in the exchange inbox".to_string(),
                    code: "INBOX_EMPTY".to_string(),
                }),
            )
                .into_response()
        }
    }
}
