//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{AttributeSpec, ImporterConfig};
use crate::error::{ImportError, ImportResult};
use crate::excel::WorkbookImporter;
use crate::session::{ImportSession, ProcessOutcome};
use crate::types::{FileHandle, MappingPair, OutputRecord};

use super::server::{AppState, SUPPORTED_FORMATS};

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Sheetmap API Server".to_string(),
        version: state.version.clone(),
        description: "HTTP API for spreadsheet import with column mapping".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint("/api/v1/inspect", "POST", "List sheets and columns of a spreadsheet"),
            endpoint("/api/v1/import", "POST", "Map spreadsheet columns onto attributes"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
    pub formats: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["inspect".to_string(), "import".to_string()],
        formats: SUPPORTED_FORMATS.iter().map(|ext| ext.to_string()).collect(),
    }))
}

/// Inspect request
#[derive(Debug, Deserialize)]
pub struct InspectRequest {
    pub file_path: String,
    #[serde(default)]
    pub has_header: Option<bool>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// Inspect response
#[derive(Debug, Serialize, Default)]
pub struct InspectResponse {
    pub file_path: String,
    pub sheets: Vec<SheetSummary>,
}

/// POST /api/v1/inspect - List sheets and columns
pub async fn inspect(Json(req): Json<InspectRequest>) -> impl IntoResponse {
    let importer =
        WorkbookImporter::new(&req.file_path).with_header(req.has_header.unwrap_or(true));

    match importer.import_async().await {
        Ok(workbook) => {
            let sheets = workbook
                .sheets
                .iter()
                .map(|sheet| SheetSummary {
                    name: sheet.name.clone(),
                    row_count: sheet.rows.len(),
                    columns: sheet.columns(),
                })
                .collect();
            Json(ApiResponse::ok(InspectResponse {
                file_path: req.file_path,
                sheets,
            }))
        }
        Err(e) => {
            warn!(file = %req.file_path, error = %e, "inspect failed");
            Json(ApiResponse::err(e.to_string()))
        }
    }
}

/// An image pick for one record (0-based row)
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub row: usize,
    pub attribute: String,
    pub path: String,
}

/// Import request
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub file_path: String,
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub has_header: Option<bool>,
    /// 0-based sheet index
    #[serde(default)]
    pub sheet: Option<usize>,
    /// Applied over header pre-selection; an empty target clears the column
    #[serde(default)]
    pub mapping: Option<Vec<MappingPair>>,
    #[serde(default)]
    pub images: Option<Vec<ImageRequest>>,
}

/// Import response
#[derive(Debug, Serialize, Default)]
pub struct ImportResponse {
    pub records: Vec<OutputRecord>,
    pub record_count: usize,
}

/// POST /api/v1/import - Map a spreadsheet onto attributes
pub async fn import(Json(req): Json<ImportRequest>) -> impl IntoResponse {
    match run_import(req).await {
        Ok(records) => Json(ApiResponse::ok(ImportResponse {
            record_count: records.len(),
            records,
        })),
        Err(e) => Json(ApiResponse::err(e.to_string())),
    }
}

async fn run_import(req: ImportRequest) -> ImportResult<Vec<OutputRecord>> {
    let mut config = ImporterConfig::with_attributes(req.attributes);
    if let Some(has_header) = req.has_header {
        config.has_header = has_header;
    }

    let mut session = ImportSession::new(config)?;
    session.on_error(|e| debug!(error = %e, "import error"));
    session.load_path_async(&PathBuf::from(&req.file_path)).await?;

    if let Some(index) = req.sheet {
        session.select_sheet(index)?;
    }
    for pair in req.mapping.unwrap_or_default() {
        let target = Some(pair.target_attribute.as_str()).filter(|t| !t.is_empty());
        session.set_mapping(&pair.source_column, target)?;
    }
    for image in req.images.unwrap_or_default() {
        let file = FileHandle::from_path(&image.path)?;
        session.attach_image(image.row, &image.attribute, file)?;
    }

    match session.process()? {
        ProcessOutcome::Emitted(records) => Ok(records),
        ProcessOutcome::ImagesPending { records } => {
            debug!(records, "attaching images");
            match session.process()? {
                ProcessOutcome::Emitted(records) => Ok(records),
                ProcessOutcome::ImagesPending { .. } => Err(ImportError::NoDataProcessed),
            }
        }
    }
}
