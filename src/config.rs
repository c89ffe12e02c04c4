//! Loading server configuration (port, CORS origins, upload limit) from TOML.
//!
//! The file is optional: without `SERVER_CONFIG_PATH` (or on any parse/IO
//! error) we run on defaults, which suit local development with the Vite
//! frontend on port 5173.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_port")]
  pub port: u16,
  /// Exact origins allowed by CORS (with credentials). Empty means a
  /// permissive any-origin layer without credentials.
  #[serde(default = "default_cors_origins")]
  pub cors_origins: Vec<String>,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
}

fn default_port() -> u16 {
  8000
}

fn default_cors_origins() -> Vec<String> {
  vec!["http://localhost:5173".into(), "http://127.0.0.1:5173".into()]
}

fn default_max_upload_bytes() -> usize {
  10 * 1024 * 1024
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      port: default_port(),
      cors_origins: default_cors_origins(),
      max_upload_bytes: default_max_upload_bytes(),
    }
  }
}

/// Attempt to load `ServerConfig` from SERVER_CONFIG_PATH. On any parsing/IO
/// error, returns None.
pub fn load_server_config_from_env() -> Option<ServerConfig> {
  let path = std::env::var("SERVER_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<ServerConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quizzz_backend", %path, "Loaded server config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizzz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quizzz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_fields_fall_back_to_defaults() {
    let cfg: ServerConfig = toml::from_str("").unwrap();
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.cors_origins.len(), 2);
    assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
  }

  #[test]
  fn explicit_values_win() {
    let cfg: ServerConfig =
      toml::from_str("port = 9000\ncors_origins = []\nmax_upload_bytes = 1024").unwrap();
    assert_eq!(cfg.port, 9000);
    assert!(cfg.cors_origins.is_empty());
    assert_eq!(cfg.max_upload_bytes, 1024);
  }
}
