//! Application state for the annotation API

use std::path::Path;
use std::sync::Arc;

use annotate_core::FontRegistry;
use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::Config;
use crate::store::ProjectStore;

pub struct AppState {
    /// Read-only after startup, shared by every compositing request
    pub fonts: Arc<FontRegistry>,
    pub projects: ProjectStore,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;

        let fonts = load_fonts(&config.fonts_dir);
        Self::with_pool(pool, fonts).await
    }

    /// Build state over an existing pool, running migrations
    pub async fn with_pool(pool: SqlitePool, fonts: FontRegistry) -> Result<Self> {
        let projects = ProjectStore::new(pool);
        projects.run_migrations().await?;
        Ok(Self {
            fonts: Arc::new(fonts),
            projects,
        })
    }
}

/// Register the font files found in `dir`. A missing directory leaves only
/// the built-in fonts.
pub fn load_fonts(dir: &Path) -> FontRegistry {
    let mut registry = FontRegistry::new();
    registry.add_default_aliases();
    match registry.load_dir(dir) {
        Ok(count) => tracing::info!(
            "Registered {} font files ({} families) from {}",
            count,
            registry.family_count(),
            dir.display()
        ),
        Err(e) => tracing::warn!("No fonts registered, using built-in fonts only: {}", e),
    }
    registry
}
