// SPDX-License-Identifier: MIT

//! Pinspire: AI-assisted Pinterest post scheduling
//!
//! This crate provides the backend API for drafting posts, generating
//! captions and images with AI, and publishing to Pinterest boards through
//! OAuth-linked accounts (mock or real).

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use middleware::RateLimiter;
use services::{AiService, PinterestService, PostPublisher};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub pinterest: PinterestService,
    pub ai: AiService,
    pub publisher: PostPublisher,
    pub rate_limiter: RateLimiter,
}
