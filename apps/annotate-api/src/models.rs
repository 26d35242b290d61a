//! Request and response bodies for the annotation API
//!
//! Documents travel base64-encoded. Field names follow what the editor
//! already sends, so several accept an alias.

use annotate_core::Annotation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::ProjectSummary;

fn empty_object() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Response to a PDF upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub pdf_data: String,
    pub filename: String,
    pub num_pages: usize,
    pub message: String,
}

/// Request to save a project
#[derive(Debug, Clone, Deserialize)]
pub struct SaveProjectRequest {
    /// Overwrite this project instead of creating a new one
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
    #[serde(default, alias = "pdfData")]
    pub pdf_data: Option<String>,
    #[serde(default, alias = "pdfFilename")]
    pub pdf_filename: String,
    /// Stored exactly as sent, including editor bookkeeping fields
    #[serde(default)]
    pub annotations: Vec<Value>,
    #[serde(default = "empty_object")]
    pub metadata: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveProjectResponse {
    pub success: bool,
    pub project_id: String,
    pub message: String,
}

/// A stored project without its document bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectData {
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub pdf_filename: String,
    pub document_hash: String,
    pub annotations: Vec<Value>,
    pub metadata: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadProjectResponse {
    pub success: bool,
    pub project_data: ProjectData,
    pub pdf_data: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListItem {
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub pdf_filename: String,
    pub annotation_count: i64,
}

impl From<ProjectSummary> for ProjectListItem {
    fn from(summary: ProjectSummary) -> Self {
        Self {
            project_id: summary.project_id,
            created_at: summary.created_at,
            pdf_filename: summary.pdf_filename,
            annotation_count: summary.annotation_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProjectsResponse {
    pub success: bool,
    pub projects: Vec<ProjectListItem>,
}

/// Request to burn annotations into a document
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePdfRequest {
    #[serde(default, alias = "pdf_data", alias = "pdfData")]
    pub document: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Request to insert a blank page
#[derive(Debug, Clone, Deserialize)]
pub struct InsertPageRequest {
    #[serde(default, alias = "pdfData", alias = "pdf_data")]
    pub document: Option<String>,
    #[serde(default, rename = "pageIndex", alias = "page_index")]
    pub page_index: Option<i64>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertPageResponse {
    pub success: bool,
    pub document: String,
    /// Same bytes as `document`, under the name the editor reads
    #[serde(rename = "pdfData")]
    pub pdf_data: String,
    pub message: String,
}
