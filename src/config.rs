//! Configuration management for the crop server.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory holding temporary uploads for the duration of a request.
    pub dir: PathBuf,
    /// Multipart body limit in bytes.
    pub max_file_size: usize,
}

/// 200 MB upload limit.
pub const DEFAULT_MAX_FILE_SIZE: usize = 200 * 1024 * 1024;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            upload: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_file_size: DEFAULT_MAX_FILE_SIZE,
            },
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or(defaults.server.host),
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            upload: UploadConfig {
                dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.upload.dir),
                max_file_size: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.upload.max_file_size),
            },
        }
    }
}
