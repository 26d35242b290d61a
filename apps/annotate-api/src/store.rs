//! Project persistence: document bytes, annotations and metadata in SQLite
//!
//! A project is always written whole; saving under an existing id replaces
//! the previous row.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use uuid::Uuid;

/// A project as submitted for saving
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Existing id to overwrite; a new id is generated when absent
    pub project_id: Option<String>,
    pub pdf_filename: String,
    pub pdf_data: Vec<u8>,
    pub annotations: Vec<Value>,
    pub metadata: Value,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub pdf_filename: String,
    pub pdf_data: Vec<u8>,
    pub document_hash: String,
    pub annotations: Vec<Value>,
    pub metadata: Value,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectSummary {
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub pdf_filename: String,
    pub annotation_count: i64,
}

#[derive(Debug, FromRow)]
struct DbProject {
    project_id: String,
    created_at: DateTime<Utc>,
    pdf_filename: String,
    pdf_data: Vec<u8>,
    document_hash: String,
    annotations_json: String,
    metadata_json: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt project data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ProjectStore {
    pool: SqlitePool,
}

impl ProjectStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                project_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                pdf_filename TEXT NOT NULL,
                pdf_data BLOB NOT NULL,
                document_hash TEXT NOT NULL,
                annotations_json TEXT NOT NULL,
                annotation_count INTEGER NOT NULL DEFAULT 0,
                metadata_json TEXT NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Listing is newest first
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Save a project, returning its id
    pub async fn save(&self, project: NewProject) -> Result<String, StoreError> {
        let project_id = project
            .project_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let document_hash = hex::encode(Sha256::digest(&project.pdf_data));
        let annotations_json = serde_json::to_string(&project.annotations)?;
        let metadata_json = serde_json::to_string(&project.metadata)?;
        // Fixed-width timestamps so text ordering is chronological
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO projects (project_id, created_at, pdf_filename, pdf_data, document_hash, annotations_json, annotation_count, metadata_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project_id)
        .bind(now.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(&project.pdf_filename)
        .bind(&project.pdf_data)
        .bind(&document_hash)
        .bind(&annotations_json)
        .bind(project.annotations.len() as i64)
        .bind(&metadata_json)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Saved project {} ({}, {} annotations)",
            project_id,
            project.pdf_filename,
            project.annotations.len()
        );
        Ok(project_id)
    }

    pub async fn load(&self, project_id: &str) -> Result<Option<Project>, StoreError> {
        let row: Option<DbProject> = sqlx::query_as(
            r#"
            SELECT project_id, created_at, pdf_filename, pdf_data, document_hash,
                   annotations_json, metadata_json
            FROM projects
            WHERE project_id = ?
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Project {
            project_id: row.project_id,
            created_at: row.created_at,
            pdf_filename: row.pdf_filename,
            pdf_data: row.pdf_data,
            document_hash: row.document_hash,
            annotations: serde_json::from_str(&row.annotations_json)?,
            metadata: serde_json::from_str(&row.metadata_json)?,
        }))
    }

    /// All projects, newest first
    pub async fn list(&self) -> Result<Vec<ProjectSummary>, StoreError> {
        let projects = sqlx::query_as(
            r#"
            SELECT project_id, created_at, pdf_filename, annotation_count
            FROM projects
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }
}
