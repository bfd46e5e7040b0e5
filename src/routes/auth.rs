// SPDX-License-Identifier: MIT

//! Account routes: signup, login, profile management.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, load_user, AuthUser};
use crate::models::User;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Public routes (no session required).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

/// Session-protected account routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/update-profile", put(update_profile))
        .route("/api/auth/update-password", put(update_password))
}

// ─── Password Hashing ────────────────────────────────────────

/// Hash a password with Argon2id; output is a PHC string.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored hash (constant-time).
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid stored password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Password verification failed: {}",
            e
        ))),
    }
}

// ─── Payloads ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct SignupRequest {
    #[validate(length(min = 3, max = 50))]
    username: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize, Validate)]
struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 50))]
    username: Option<String>,
    #[validate(email)]
    email: Option<String>,
}

#[derive(Deserialize, Validate)]
struct UpdatePasswordRequest {
    current_password: String,
    #[validate(length(min = 8))]
    new_password: String,
}

/// User fields safe to return to the client.
#[derive(Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub pinterest_connected: bool,
    pub pinterest_username: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            pinterest_connected: user.pinterest_connected,
            pinterest_username: user.pinterest_username.clone(),
        }
    }
}

#[derive(Serialize)]
struct AuthResponse {
    access_token: String,
    token_type: String,
    user: UserSummary,
}

// ─── Handlers ────────────────────────────────────────────────

/// Create a new account and issue a session token.
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let username_taken = state
        .db
        .get_user_by_username(&payload.username)
        .await?
        .is_some();
    let email_taken = state.db.get_user_by_email(&payload.email).await?.is_some();
    if username_taken || email_taken {
        return Err(AppError::Validation(
            "Username or email already exists".to_string(),
        ));
    }

    let now = now_rfc3339();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: payload.username,
        email: payload.email,
        password_hash: hash_password(&payload.password)?,
        pinterest_connected: false,
        pinterest_access_token: None,
        pinterest_refresh_token: None,
        pinterest_token_expires_at: None,
        pinterest_username: None,
        pinterest_oauth_state: None,
        pinterest_credentials: None,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "New account created");

    let access_token = create_jwt(&user.id, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserSummary::from(&user),
    }))
}

/// Verify credentials and issue a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state
        .db
        .get_user_by_username(&payload.username)
        .await?
        .ok_or_else(|| AppError::Auth("Incorrect username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Auth("Incorrect username or password".to_string()));
    }

    let access_token = create_jwt(&user.id, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserSummary::from(&user),
    }))
}

/// Current account details.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserSummary>> {
    let user = load_user(&state, &auth).await?;
    Ok(Json(UserSummary::from(&user)))
}

/// Change username and/or email.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserSummary>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut user = load_user(&state, &auth).await?;

    if let Some(username) = payload.username {
        if username != user.username {
            if state.db.get_user_by_username(&username).await?.is_some() {
                return Err(AppError::Validation("Username already exists".to_string()));
            }
            user.username = username;
        }
    }

    if let Some(email) = payload.email {
        if email != user.email {
            if state.db.get_user_by_email(&email).await?.is_some() {
                return Err(AppError::Validation("Email already exists".to_string()));
            }
            user.email = email;
        }
    }

    user.updated_at = now_rfc3339();
    state.db.upsert_user(&user).await?;

    Ok(Json(UserSummary::from(&user)))
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
}

/// Change password after verifying the current one.
async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut user = load_user(&state, &auth).await?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        return Err(AppError::Auth("Current password is incorrect".to_string()));
    }

    user.password_hash = hash_password(&payload.new_password)?;
    user.updated_at = now_rfc3339();
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "Password updated");

    Ok(Json(MessageResponse {
        success: true,
        message: "Password updated successfully".to_string(),
    }))
}
