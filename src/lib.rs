//! Content recommendation and trending engine for the feed.
//!
//! In-process library: ingests user↔content interactions, maintains
//! per-user preference models, computes time-windowed trending signals and
//! a global popularity ranking, and produces deduplicated, capped,
//! score-ordered recommendation lists per user.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use services::{ContentSource, InMemoryContentSource, RecommendationEngine};
