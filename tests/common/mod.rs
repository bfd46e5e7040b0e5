// SPDX-License-Identifier: MIT

use pinspire::config::Config;
use pinspire::db::FirestoreDb;
use pinspire::middleware::RateLimiter;
use pinspire::routes::create_router;
use pinspire::services::{AiService, PinterestService, PostPublisher};
use pinspire::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app from explicit parts.
#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    db: FirestoreDb,
    rate_limiter: RateLimiter,
) -> (axum::Router, Arc<AppState>) {
    let pinterest = PinterestService::new(db.clone(), config.clone());
    let ai = AiService::new(&config.openai_api_key);
    let publisher = PostPublisher::new(db.clone(), pinterest.clone());

    let state = Arc::new(AppState {
        config,
        db,
        pinterest,
        ai,
        publisher,
        rate_limiter,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies and a generous
/// rate-limit budget.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(
        Config::test_default(),
        test_db_offline(),
        RateLimiter::new(10_000, 60),
    )
}
