// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Pinterest and OpenAI credentials are optional: missing or placeholder
//! values switch the corresponding integration into mock mode.

use std::env;

/// Prefix that marks a credential as a placeholder rather than a real value.
pub const PLACEHOLDER_PREFIX: &str = "MOCK_";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Process-wide Pinterest app ID (may be empty or a placeholder)
    pub pinterest_app_id: String,
    /// Process-wide Pinterest app secret
    pub pinterest_app_secret: String,
    /// OAuth redirect URI registered with Pinterest
    pub pinterest_redirect_uri: String,
    /// OpenAI API key for caption/image generation
    pub openai_api_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_secret: Vec<u8>,
    /// GCP project ID for Firestore
    pub gcp_project_id: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            pinterest_app_id: env::var("PINTEREST_APP_ID").unwrap_or_default(),
            pinterest_app_secret: env::var("PINTEREST_APP_SECRET").unwrap_or_default(),
            pinterest_redirect_uri: env::var("PINTEREST_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:3000/pinterest/callback".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()
                .unwrap_or(8001),
        })
    }

    /// Config for tests: placeholder integrations, fixed signing key.
    pub fn test_default() -> Self {
        Self {
            pinterest_app_id: String::new(),
            pinterest_app_secret: String::new(),
            pinterest_redirect_uri: "http://localhost:3000/pinterest/callback".to_string(),
            openai_api_key: String::new(),
            jwt_secret: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8001,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
