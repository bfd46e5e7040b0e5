// SPDX-License-Identifier: MIT

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Per-user Pinterest app credentials, overriding the process-wide ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinterestCredentials {
    pub app_id: String,
    pub app_secret: String,
    /// Redirect URI registered with the user's own Pinterest app
    pub redirect_uri: Option<String>,
}

/// User account stored in Firestore.
///
/// The Pinterest linkage fields are embedded directly on the user document;
/// `pinterest_connected == true` implies `pinterest_access_token` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID string, also used as document ID
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,

    pub pinterest_connected: bool,
    pub pinterest_access_token: Option<String>,
    pub pinterest_refresh_token: Option<String>,
    /// Absolute access-token expiry (RFC 3339)
    pub pinterest_token_expires_at: Option<String>,
    /// Display name of the linked Pinterest account
    pub pinterest_username: Option<String>,
    /// Anti-forgery nonce for an in-flight OAuth connect
    pub pinterest_oauth_state: Option<String>,
    pub pinterest_credentials: Option<PinterestCredentials>,

    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Reset all Pinterest linkage fields to the disconnected state.
    pub fn clear_pinterest_linkage(&mut self) {
        self.pinterest_connected = false;
        self.pinterest_access_token = None;
        self.pinterest_refresh_token = None;
        self.pinterest_token_expires_at = None;
        self.pinterest_username = None;
        self.pinterest_oauth_state = None;
    }
}
