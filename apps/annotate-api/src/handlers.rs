//! HTTP handlers for the annotation API

use std::sync::Arc;

use annotate_core::{composite_document, document_info, insert_blank_page, InsertPosition};
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;
use crate::store::NewProject;

fn decode_document(encoded: Option<&str>) -> Result<Vec<u8>, ApiError> {
    let encoded = encoded
        .map(str::trim)
        .filter(|data| !data.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("PDF data is required".into()))?;
    BASE64
        .decode(encoded)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid PDF base64: {}", e)))
}

/// Run CPU-bound document work off the async executor
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, annotate_core::AnnotateError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(ApiError::from)
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        message: "PDF Annotation API is running".into(),
    })
}

/// Accept a PDF upload and hand it back base64-encoded with its page count
pub async fn upload_pdf(mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid upload: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::InvalidRequest("No file provided".into()))?;
    if filename.is_empty() {
        return Err(ApiError::InvalidRequest("No file selected".into()));
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::InvalidRequest("File must be a PDF".into()));
    }

    let bytes = data.to_vec();
    let info = blocking(move || document_info(&bytes))
        .await
        .map_err(|e| match e {
            ApiError::InvalidDocument(msg) => {
                ApiError::InvalidRequest(format!("Error processing PDF: {}", msg))
            }
            other => other,
        })?;

    tracing::info!("Uploaded {} ({} pages)", filename, info.page_count);
    Ok(Json(UploadResponse {
        success: true,
        pdf_data: BASE64.encode(&data),
        filename,
        num_pages: info.page_count,
        message: "PDF uploaded successfully".into(),
    }))
}

/// Save (or overwrite) a project
pub async fn save_project(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveProjectRequest>, JsonRejection>,
) -> Result<Json<SaveProjectResponse>, ApiError> {
    let Json(req) = payload?;
    let pdf_data = match req.pdf_data.as_deref().map(str::trim) {
        Some(data) if !data.is_empty() => decode_document(Some(data))?,
        _ => Vec::new(),
    };

    let project_id = state
        .projects
        .save(NewProject {
            project_id: req.project_id,
            pdf_filename: req.pdf_filename,
            pdf_data,
            annotations: req.annotations,
            metadata: req.metadata,
        })
        .await?;

    Ok(Json(SaveProjectResponse {
        success: true,
        project_id,
        message: "Project saved successfully".into(),
    }))
}

/// Load a project by id
pub async fn load_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<LoadProjectResponse>, ApiError> {
    let project = state
        .projects
        .load(&id)
        .await?
        .ok_or_else(|| ApiError::ProjectNotFound(id.clone()))?;

    Ok(Json(LoadProjectResponse {
        success: true,
        pdf_data: BASE64.encode(&project.pdf_data),
        project_data: ProjectData {
            project_id: project.project_id,
            created_at: project.created_at,
            pdf_filename: project.pdf_filename,
            document_hash: project.document_hash,
            annotations: project.annotations,
            metadata: project.metadata,
        },
        message: "Project loaded successfully".into(),
    }))
}

/// List saved projects, newest first
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListProjectsResponse>, ApiError> {
    let projects = state.projects.list().await?;
    Ok(Json(ListProjectsResponse {
        success: true,
        projects: projects.into_iter().map(ProjectListItem::from).collect(),
    }))
}

/// Burn the annotations into the document and return the finished PDF
pub async fn generate_pdf(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GeneratePdfRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let document = decode_document(req.document.as_deref())?;
    tracing::info!(
        "Generating PDF: {} bytes, {} annotations",
        document.len(),
        req.annotations.len()
    );

    let fonts = Arc::clone(&state.fonts);
    let annotations = req.annotations;
    let output = blocking(move || composite_document(&document, &annotations, &fonts)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"annotated_document.pdf\"",
            ),
        ],
        output,
    ))
}

/// Insert a blank page before or after a page
pub async fn insert_page(
    payload: Result<Json<InsertPageRequest>, JsonRejection>,
) -> Result<Json<InsertPageResponse>, ApiError> {
    let Json(req) = payload?;
    let document = decode_document(req.document.as_deref())?;
    let page_index = req
        .page_index
        .ok_or_else(|| ApiError::InvalidRequest("Page index is required".into()))?;
    let position: InsertPosition = req
        .position
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(ApiError::from)?;

    let output = blocking(move || insert_blank_page(&document, page_index, position)).await?;

    let encoded = BASE64.encode(output);
    Ok(Json(InsertPageResponse {
        success: true,
        document: encoded.clone(),
        pdf_data: encoded,
        message: format!(
            "Empty page inserted {} page {}",
            position,
            page_index.saturating_add(1)
        ),
    }))
}
