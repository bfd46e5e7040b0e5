// SPDX-License-Identifier: MIT

//! Pinterest API client and token lifecycle management.
//!
//! Handles:
//! - Mock/real mode resolution from app credentials
//! - OAuth connect flow (authorization URL, code exchange, state nonce)
//! - Token refresh when expired
//! - Board listing and pin creation

use crate::config::{Config, PLACEHOLDER_PREFIX};
use crate::error::AppError;
use crate::models::User;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

const PINTEREST_API_BASE: &str = "https://api.pinterest.com/v5";
const PINTEREST_AUTH_URL: &str = "https://www.pinterest.com/oauth/";
const PINTEREST_TOKEN_URL: &str = "https://api.pinterest.com/v5/oauth/token";

const OAUTH_SCOPES: &str = "boards:read,boards:write,pins:read,pins:write,user_accounts:read";

/// Username recorded when the account-info lookup fails after connect.
const FALLBACK_USERNAME: &str = "pinterest_user";

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Pinterest caps pin titles at 100 characters.
pub const PIN_TITLE_MAX_CHARS: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Credential resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Effective Pinterest app credentials for one user.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: String,
    pub redirect_uri: String,
}

/// True when a credential value is usable for real API calls.
fn credential_is_real(value: &str) -> bool {
    !value.is_empty() && !value.starts_with(PLACEHOLDER_PREFIX)
}

/// Resolve the effective credentials and mode for a user.
///
/// Personal credentials saved on the user record take precedence over the
/// process-wide configuration. Mock mode applies unless both the app ID and
/// secret are present and non-placeholder. Pure function; no side effects.
pub fn resolve_credentials(config: &Config, user: &User) -> (AppCredentials, bool) {
    let creds = match &user.pinterest_credentials {
        Some(personal) => AppCredentials {
            app_id: personal.app_id.clone(),
            app_secret: personal.app_secret.clone(),
            redirect_uri: personal
                .redirect_uri
                .clone()
                .unwrap_or_else(|| config.pinterest_redirect_uri.clone()),
        },
        None => AppCredentials {
            app_id: config.pinterest_app_id.clone(),
            app_secret: config.pinterest_app_secret.clone(),
            redirect_uri: config.pinterest_redirect_uri.clone(),
        },
    };

    let is_mock = !(credential_is_real(&creds.app_id) && credential_is_real(&creds.app_secret));
    (creds, is_mock)
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// Token bundle returned by both code exchange and refresh.
///
/// The access token is a secret; neither token is ever logged.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// A Pinterest board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default)]
    pub pin_count: Option<u32>,
}

/// Paginated envelope around board listings. Only the first page is consumed.
#[derive(Debug, Deserialize)]
struct BoardsEnvelope {
    #[serde(default)]
    items: Vec<Board>,
}

/// A created pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    pub id: String,
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Linked account info, used only to populate the display username.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub username: String,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Real client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the real Pinterest v5 API.
#[derive(Clone)]
pub struct RealPinterestClient {
    http: reqwest::Client,
    api_base: String,
    auth_base: String,
    token_url: String,
    creds: AppCredentials,
}

impl RealPinterestClient {
    pub fn new(creds: AppCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: PINTEREST_API_BASE.to_string(),
            auth_base: PINTEREST_AUTH_URL.to_string(),
            token_url: PINTEREST_TOKEN_URL.to_string(),
            creds,
        }
    }

    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.auth_base,
            urlencoding::encode(&self.creds.app_id),
            urlencoding::encode(&self.creds.redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenBundle, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.creds.app_id, Some(&self.creds.app_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.creds.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Token exchange request failed: {}", e)))?;

        self.check_json(response).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.creds.app_id, Some(&self.creds.app_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Token refresh request failed: {}", e)))?;

        self.check_json(response).await
    }

    async fn list_boards(&self, access_token: &str) -> Result<Vec<Board>, AppError> {
        let url = format!("{}/boards", self.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let envelope: BoardsEnvelope = self.check_json(response).await?;
        Ok(envelope.items)
    }

    async fn create_pin(
        &self,
        access_token: &str,
        board_id: &str,
        title: &str,
        description: &str,
        image_url: &str,
        link: Option<&str>,
    ) -> Result<Pin, AppError> {
        let mut pin_data = serde_json::json!({
            "board_id": board_id,
            "title": title,
            "description": description,
            "media_source": {
                "source_type": "image_url",
                "url": image_url,
            },
        });
        if let Some(link) = link {
            pin_data["link"] = serde_json::Value::String(link.to_string());
        }

        let url = format!("{}/pins", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&pin_data)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        self.check_json(response).await
    }

    async fn get_account_info(&self, access_token: &str) -> Result<AccountInfo, AppError> {
        let url = format!("{}/user_account", self.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        self.check_json(response).await
    }

    /// Check response status and parse the JSON body.
    ///
    /// Any non-2xx response surfaces as `Upstream` carrying the provider's
    /// raw response body.
    async fn check_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock client
// ─────────────────────────────────────────────────────────────────────────────

/// Simulated Pinterest used when no real credentials are configured.
///
/// Never touches the network and never errors.
#[derive(Clone, Copy, Default)]
pub struct MockPinterestClient;

fn mock_hex(len: usize) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    hex[..len].to_string()
}

impl MockPinterestClient {
    fn authorization_url(&self, state: &str) -> String {
        format!("/pinterest/mock-auth?state={}&mock=true", state)
    }

    fn exchange_code(&self, _code: &str) -> TokenBundle {
        TokenBundle {
            access_token: format!("mock_access_token_{}", mock_hex(16)),
            refresh_token: Some(format!("mock_refresh_token_{}", mock_hex(16))),
            expires_in: 3600,
        }
    }

    fn refresh_token(&self, refresh_token: &str) -> TokenBundle {
        TokenBundle {
            access_token: format!("mock_access_token_{}", mock_hex(16)),
            refresh_token: Some(refresh_token.to_string()),
            expires_in: 3600,
        }
    }

    fn list_boards(&self) -> Vec<Board> {
        [
            "My Inspiration Board",
            "Design Ideas",
            "Marketing Tips",
            "Travel Dreams",
            "Recipe Collection",
        ]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let n = i as u32 + 1;
            Board {
                id: format!("mock_board_{}", n),
                name: name.to_string(),
                description: Some(format!("A sample {} board", name.to_lowercase())),
                privacy: Some("PUBLIC".to_string()),
                pin_count: Some(10 + n * 5),
            }
        })
        .collect()
    }

    fn create_pin(
        &self,
        board_id: &str,
        title: &str,
        description: &str,
        image_url: &str,
        link: Option<&str>,
    ) -> Pin {
        Pin {
            id: format!("mock_pin_{}", mock_hex(12)),
            board_id: Some(board_id.to_string()),
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            link: Some(link.unwrap_or(image_url).to_string()),
        }
    }

    fn get_account_info(&self) -> AccountInfo {
        AccountInfo {
            username: "mock_pinterest_user".to_string(),
            account_type: Some("BUSINESS".to_string()),
            profile_image: Some("https://via.placeholder.com/150".to_string()),
            website_url: Some("https://example.com".to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unified client
// ─────────────────────────────────────────────────────────────────────────────

/// One client interface with mock and real implementations, selected once at
/// construction from the resolved credentials.
#[derive(Clone)]
pub enum PinterestClient {
    Mock(MockPinterestClient),
    Real(RealPinterestClient),
}

impl PinterestClient {
    pub fn is_mock(&self) -> bool {
        matches!(self, PinterestClient::Mock(_))
    }

    pub fn authorization_url(&self, state: &str) -> String {
        match self {
            PinterestClient::Mock(mock) => mock.authorization_url(state),
            PinterestClient::Real(real) => real.authorization_url(state),
        }
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenBundle, AppError> {
        match self {
            PinterestClient::Mock(mock) => Ok(mock.exchange_code(code)),
            PinterestClient::Real(real) => real.exchange_code(code).await,
        }
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        match self {
            PinterestClient::Mock(mock) => Ok(mock.refresh_token(refresh_token)),
            PinterestClient::Real(real) => real.refresh_token(refresh_token).await,
        }
    }

    pub async fn list_boards(&self, access_token: &str) -> Result<Vec<Board>, AppError> {
        match self {
            PinterestClient::Mock(mock) => Ok(mock.list_boards()),
            PinterestClient::Real(real) => real.list_boards(access_token).await,
        }
    }

    pub async fn create_pin(
        &self,
        access_token: &str,
        board_id: &str,
        title: &str,
        description: &str,
        image_url: &str,
        link: Option<&str>,
    ) -> Result<Pin, AppError> {
        match self {
            PinterestClient::Mock(mock) => {
                Ok(mock.create_pin(board_id, title, description, image_url, link))
            }
            PinterestClient::Real(real) => {
                real.create_pin(access_token, board_id, title, description, image_url, link)
                    .await
            }
        }
    }

    pub async fn get_account_info(&self, access_token: &str) -> Result<AccountInfo, AppError> {
        match self {
            PinterestClient::Mock(mock) => Ok(mock.get_account_info()),
            PinterestClient::Real(real) => real.get_account_info(access_token).await,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PinterestService - OAuth flow and token lifecycle
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::FirestoreDb;
use crate::time_utils::now_rfc3339;
use chrono::{DateTime, Duration, Utc};

/// Report of the resolved integration mode for a user.
#[derive(Debug, Serialize)]
pub struct ModeInfo {
    pub is_mock: bool,
    pub mode: String,
    pub message: String,
    pub app_id_configured: bool,
    pub app_secret_configured: bool,
}

/// Result of starting the connect flow.
#[derive(Debug, Serialize)]
pub struct ConnectStart {
    pub auth_url: String,
    pub state: String,
    pub is_mock: bool,
}

/// True when the stored expiry is inside the refresh margin (or missing or
/// unparseable, both treated as already expired).
fn needs_refresh(expires_at: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(raw) = expires_at else {
        return true;
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(expiry) => {
            now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= expiry.with_timezone(&Utc)
        }
        Err(_) => true,
    }
}

/// Generate a fresh random state nonce (16 bytes, URL-safe base64).
fn generate_state_nonce() -> Result<String, AppError> {
    use ring::rand::SecureRandom;

    let rng = ring::rand::SystemRandom::new();
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Constant-time comparison of the presented state against the stored nonce.
fn nonce_matches(stored: &str, presented: &str) -> bool {
    use subtle::ConstantTimeEq;

    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// Write a token bundle onto the user record.
///
/// A refresh response may omit the refresh token; the previous one is kept.
fn apply_token_bundle(user: &mut User, bundle: &TokenBundle, now: DateTime<Utc>) {
    user.pinterest_access_token = Some(bundle.access_token.clone());
    if bundle.refresh_token.is_some() {
        user.pinterest_refresh_token = bundle.refresh_token.clone();
    }
    user.pinterest_token_expires_at = Some(
        crate::time_utils::format_utc_rfc3339(now + Duration::seconds(bundle.expires_in)),
    );
}

/// High-level Pinterest service that manages the OAuth flow and token
/// lifecycle around the mode-resolved client.
#[derive(Clone)]
pub struct PinterestService {
    db: FirestoreDb,
    config: Config,
}

impl PinterestService {
    pub fn new(db: FirestoreDb, config: Config) -> Self {
        Self { db, config }
    }

    /// Resolve the client implementation for this user.
    pub fn client_for(&self, user: &User) -> PinterestClient {
        let (creds, is_mock) = resolve_credentials(&self.config, user);
        if is_mock {
            PinterestClient::Mock(MockPinterestClient)
        } else {
            PinterestClient::Real(RealPinterestClient::new(creds))
        }
    }

    /// Describe the resolved mode for this user.
    pub fn mode_info(&self, user: &User) -> ModeInfo {
        let (creds, is_mock) = resolve_credentials(&self.config, user);
        let message = if is_mock {
            "Using mock Pinterest API for testing. Update credentials in settings to use real Pinterest."
        } else {
            "Connected to real Pinterest API"
        };

        ModeInfo {
            is_mock,
            mode: if is_mock { "MOCK" } else { "REAL" }.to_string(),
            message: message.to_string(),
            app_id_configured: credential_is_real(&creds.app_id),
            app_secret_configured: credential_is_real(&creds.app_secret),
        }
    }

    // ─── OAuth Flow ──────────────────────────────────────────────────────────

    /// Start the connect flow: persist a fresh state nonce (overwriting any
    /// prior one) and return the authorization URL.
    pub async fn initiate(&self, user: &User) -> Result<ConnectStart, AppError> {
        let state_nonce = generate_state_nonce()?;
        let client = self.client_for(user);
        let auth_url = client.authorization_url(&state_nonce);

        let mut updated = user.clone();
        updated.pinterest_oauth_state = Some(state_nonce.clone());
        updated.updated_at = now_rfc3339();
        self.db.upsert_user(&updated).await?;

        tracing::info!(user_id = %user.id, mock = client.is_mock(), "Pinterest connect started");

        Ok(ConnectStart {
            auth_url,
            state: state_nonce,
            is_mock: client.is_mock(),
        })
    }

    /// Complete the connect flow: verify the state nonce (real mode only),
    /// exchange the code, and persist the connected linkage.
    pub async fn complete_callback(
        &self,
        user: &User,
        code: &str,
        state: &str,
    ) -> Result<User, AppError> {
        let client = self.client_for(user);

        // Mock mode skips the check: no third party redirects back with a
        // verifiable value.
        if !client.is_mock() {
            let stored = user
                .pinterest_oauth_state
                .as_deref()
                .ok_or(AppError::InvalidState)?;
            if !nonce_matches(stored, state) {
                tracing::warn!(user_id = %user.id, "OAuth state mismatch on callback");
                return Err(AppError::InvalidState);
            }
        }

        let bundle = client.exchange_code(code).await?;

        // Non-fatal: a failed account lookup falls back to a placeholder name.
        let username = match client.get_account_info(&bundle.access_token).await {
            Ok(info) => info.username,
            Err(e) => {
                tracing::warn!(error = %e, "Account info lookup failed, using placeholder");
                FALLBACK_USERNAME.to_string()
            }
        };

        let mut updated = user.clone();
        apply_token_bundle(&mut updated, &bundle, Utc::now());
        updated.pinterest_connected = true;
        updated.pinterest_username = Some(username);
        updated.pinterest_oauth_state = None;
        updated.updated_at = now_rfc3339();
        self.db.upsert_user(&updated).await?;

        tracing::info!(user_id = %updated.id, mock = client.is_mock(), "Pinterest connected");

        Ok(updated)
    }

    /// Clear all Pinterest linkage. Idempotent.
    pub async fn disconnect(&self, user: &User) -> Result<User, AppError> {
        let mut updated = user.clone();
        updated.clear_pinterest_linkage();
        updated.updated_at = now_rfc3339();
        self.db.upsert_user(&updated).await?;

        tracing::info!(user_id = %updated.id, "Pinterest disconnected");

        Ok(updated)
    }

    // ─── Token Refresh Guard ─────────────────────────────────────────────────

    /// Get an access token valid for an immediate API call, refreshing first
    /// when the stored expiry is inside the safety margin.
    ///
    /// Without a refresh token the stale access token is returned as-is and
    /// the downstream call fails naturally. Concurrent requests may each
    /// trigger a refresh; both produce valid tokens and the last persisted
    /// write wins.
    pub async fn valid_access_token(&self, user: &mut User) -> Result<String, AppError> {
        let access = user
            .pinterest_access_token
            .clone()
            .ok_or(AppError::NotConnected)?;

        if !needs_refresh(user.pinterest_token_expires_at.as_deref(), Utc::now()) {
            return Ok(access);
        }

        let Some(refresh) = user.pinterest_refresh_token.clone() else {
            return Ok(access);
        };

        tracing::info!(user_id = %user.id, "Access token expiring, refreshing");

        let bundle = self.client_for(user).refresh_token(&refresh).await?;
        let new_access = bundle.access_token.clone();

        apply_token_bundle(user, &bundle, Utc::now());
        user.updated_at = now_rfc3339();
        self.db.upsert_user(user).await?;

        Ok(new_access)
    }

    // ─── API Wrappers ────────────────────────────────────────────────────────

    /// List the user's boards (refresh-guarded, first page only).
    pub async fn list_boards(&self, user: &mut User) -> Result<Vec<Board>, AppError> {
        if !user.pinterest_connected {
            return Err(AppError::NotConnected);
        }
        let access_token = self.valid_access_token(user).await?;
        self.client_for(user).list_boards(&access_token).await
    }

    /// Create a pin on a board (refresh-guarded).
    pub async fn create_pin(
        &self,
        user: &mut User,
        board_id: &str,
        title: &str,
        description: &str,
        image_url: &str,
        link: Option<&str>,
    ) -> Result<Pin, AppError> {
        if !user.pinterest_connected {
            return Err(AppError::NotConnected);
        }
        let access_token = self.valid_access_token(user).await?;
        self.client_for(user)
            .create_pin(&access_token, board_id, title, description, image_url, link)
            .await
    }
}
