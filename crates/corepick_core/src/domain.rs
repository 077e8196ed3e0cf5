//! crates/corepick_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// URL substrings that mark a link as video-hosted. Matched verbatim,
/// without URL parsing.
const VIDEO_HOST_MARKERS: [&str; 2] = ["youtube.com", "youtu.be"];

/// How a URL is treated by the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Generic,
    Video,
}

impl MediaKind {
    /// Classifies a URL as a video link or a generic page.
    pub fn classify(url: &str) -> Self {
        if VIDEO_HOST_MARKERS.iter().any(|marker| url.contains(marker)) {
            MediaKind::Video
        } else {
            MediaKind::Generic
        }
    }
}

/// The bounded text digest produced for one URL, ready for prompt construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub title: String,
    pub digest: String,
    pub media_kind: MediaKind,
}

/// A single actionable step attached to a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: Uuid,
    pub order: u32,
    pub content: String,
    pub is_completed: bool,
}

impl Step {
    /// Builds the step list for freshly generated step texts: fresh ids,
    /// contiguous 1-based `order`, nothing completed yet.
    pub fn sequence_from_contents(contents: Vec<String>) -> Vec<Step> {
        contents
            .into_iter()
            .enumerate()
            .map(|(index, content)| Step {
                id: Uuid::new_v4(),
                order: index as u32 + 1,
                content,
                is_completed: false,
            })
            .collect()
    }

    /// Checks the card invariant: every id unique within the list and
    /// `order` forming the contiguous sequence 1..=len.
    pub fn sequence_is_valid(steps: &[Step]) -> bool {
        let ids_unique = steps
            .iter()
            .all(|step| steps.iter().filter(|other| other.id == step.id).count() == 1);
        let order_contiguous = steps
            .iter()
            .enumerate()
            .all(|(index, step)| step.order == index as u32 + 1);
        ids_unique && order_contiguous
    }
}

/// A summary recovered from raw model output. Becomes a `CoreCard` once the
/// caller attaches an identifier, the source URL and a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    pub title: String,
    pub summary: Vec<String>,
    pub next_steps: Vec<Step>,
}

/// A saved card pairing a source URL with its generated summary and steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreCard {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub summary: Vec<String>,
    pub next_steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
}

impl CoreCard {
    /// Creates a card with a fresh id and the current timestamp.
    pub fn new(url: String, title: String, summary: Vec<String>, next_steps: Vec<Step>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            title,
            summary,
            next_steps,
            created_at: Utc::now(),
        }
    }

    /// Flips the completion flag of one step. Returns `false` when no step
    /// matches. Step ids and `order` are never touched.
    pub fn toggle_step(&mut self, step_id: Uuid) -> bool {
        match self.next_steps.iter_mut().find(|step| step.id == step_id) {
            Some(step) => {
                step.is_completed = !step.is_completed;
                true
            }
            None => false,
        }
    }
}
