//! crates/corepick_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like HTTP clients or files.

use crate::domain::{CoreCard, MediaKind};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Single-turn access to the generative model behind the summary pipeline.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Sends one prompt and returns the raw reply text. The reply is not
    /// guaranteed to be valid JSON; recovery happens downstream.
    async fn generate(&self, prompt: &str) -> PortResult<String>;
}

/// Outbound HTTP used by the extraction pipeline.
#[async_trait]
pub trait ContentFetchService: Send + Sync {
    /// Fetches the raw markup of a page, presenting the static client
    /// identity matching `kind`.
    async fn fetch_page(&self, url: &str, kind: MediaKind) -> PortResult<String>;

    /// Looks up the authoritative title of a video URL from its host's
    /// metadata endpoint.
    async fn fetch_video_title(&self, url: &str) -> PortResult<String>;
}

/// The persisted card list. Stored as one blob: loaded once at startup and
/// rewritten in full on every mutation.
#[async_trait]
pub trait CardStoreService: Send + Sync {
    async fn load(&self) -> PortResult<Vec<CoreCard>>;

    async fn save(&self, cards: &[CoreCard]) -> PortResult<()>;
}
