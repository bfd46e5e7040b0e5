// SPDX-License-Identifier: MIT

//! HTTP middleware.

pub mod auth;
pub mod rate_limit;
pub mod security;

pub use rate_limit::RateLimiter;
