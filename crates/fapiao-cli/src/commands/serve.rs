//! Serve command - thin HTTP facade over the record store.
//!
//! Mirrors the surrounding application's API: list, create and
//! status-update endpoints with JSON bodies and error messages.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Args;
use console::style;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use fapiao_core::error::{StoreError, ValidationError};
use fapiao_core::models::{InvoiceRecord, InvoiceStatus};
use fapiao_core::normalize::{missing_fields, normalize};
use fapiao_core::store::{JsonStore, RecordSink};

use super::{load_config, store_path};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:3210")]
    addr: String,

    /// Record store file
    #[arg(short, long)]
    store: Option<PathBuf>,
}

/// Shared application context passed to all handlers.
#[derive(Clone)]
struct AppContext {
    store: Arc<dyn RecordSink>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = JsonStore::open(store_path(&config, args.store.as_ref()))?;
    let ctx = AppContext {
        store: Arc::new(store),
    };

    let app = Router::new()
        .route("/api/invoices", get(list_invoices).post(create_invoice))
        .route("/api/invoices/:id", axum::routing::patch(update_invoice))
        .with_state(ctx);

    println!("{} Listening on http://{}", style("ℹ").blue(), args.addr);
    info!(addr = %args.addr, "serving record store API");

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// JSON error body with the appropriate status code.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Io(_) | StoreError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn list_invoices(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<InvoiceRecord>>, ApiError> {
    Ok(Json(ctx.store.list_all().await?))
}

async fn create_invoice(
    State(ctx): State<AppContext>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<InvoiceRecord>), ApiError> {
    let missing = missing_fields(&body);
    if !missing.is_empty() {
        return Err(ApiError::bad_request(
            ValidationError::MissingFields(missing).to_string(),
        ));
    }

    // Unlike the extraction pipeline, the API refuses non-numeric amounts
    // outright instead of defaulting them to zero.
    if !body["amount"].is_number() {
        return Err(ApiError::bad_request("amount must be a number"));
    }

    let invoice = normalize(&body)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let record = ctx.store.save(invoice, InvoiceStatus::Pending).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
struct StatusBody {
    status: InvoiceStatus,
}

async fn update_invoice(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<InvoiceRecord>, ApiError> {
    let record = ctx.store.update_status(&id, body.status).await?;
    Ok(Json(record))
}
