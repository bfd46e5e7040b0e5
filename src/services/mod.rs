// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod ai;
pub mod pinterest;
pub mod publisher;

pub use ai::AiService;
pub use pinterest::{PinterestClient, PinterestService};
pub use publisher::PostPublisher;
