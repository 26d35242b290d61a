//! Environment configuration for the annotation API

use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_FONTS_DIR: &str = "fonts";
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub fonts_dir: PathBuf,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Config {
    /// Read configuration from the environment (after `.env` is loaded)
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| default_database_url());

        let fonts_dir = std::env::var("FONTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_FONTS_DIR));

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        let max_body_bytes = std::env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        Self {
            port,
            database_url,
            fonts_dir,
            cors_origins,
            max_body_bytes,
        }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

/// SQLite file under the platform data directory
fn default_database_url() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("annotate-api");
    std::fs::create_dir_all(&data_dir).ok();
    format!("sqlite:{}/annotate.db?mode=rwc", data_dir.display())
}

/// Get platform-specific data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://app.example.com ,"),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert!(parse_origins("  ").is_empty());
    }

    #[test]
    fn test_default_database_url_is_sqlite() {
        let url = default_database_url();
        assert!(url.starts_with("sqlite:"));
        assert!(url.ends_with("annotate.db?mode=rwc"));
    }
}
