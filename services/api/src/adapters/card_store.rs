//! services/api/src/adapters/card_store.rs
//!
//! This module contains the card-store adapter, the concrete implementation
//! of the `CardStoreService` port from the `core` crate. The entire card list
//! lives in a single JSON file: read once at startup, rewritten in full on
//! every mutation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corepick_core::domain::{CoreCard, Step};
use corepick_core::ports::{CardStoreService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed adapter that implements the `CardStoreService` port.
#[derive(Clone)]
pub struct JsonCardStoreAdapter {
    path: PathBuf,
}

impl JsonCardStoreAdapter {
    /// Creates a new `JsonCardStoreAdapter` for the given blob path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

//=========================================================================================
// "Impure" Storage Record Structs
//=========================================================================================

// The on-disk blob uses camelCase field names, matching the JSON the web
// client reads and writes.

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepRecord {
    id: Uuid,
    order: u32,
    content: String,
    is_completed: bool,
}
impl StepRecord {
    fn to_domain(self) -> Step {
        Step {
            id: self.id,
            order: self.order,
            content: self.content,
            is_completed: self.is_completed,
        }
    }

    fn from_domain(step: &Step) -> Self {
        Self {
            id: step.id,
            order: step.order,
            content: step.content.clone(),
            is_completed: step.is_completed,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardRecord {
    id: Uuid,
    url: String,
    title: String,
    summary: Vec<String>,
    next_steps: Vec<StepRecord>,
    created_at: DateTime<Utc>,
}
impl CardRecord {
    fn to_domain(self) -> CoreCard {
        CoreCard {
            id: self.id,
            url: self.url,
            title: self.title,
            summary: self.summary,
            next_steps: self.next_steps.into_iter().map(StepRecord::to_domain).collect(),
            created_at: self.created_at,
        }
    }

    fn from_domain(card: &CoreCard) -> Self {
        Self {
            id: card.id,
            url: card.url.clone(),
            title: card.title.clone(),
            summary: card.summary.clone(),
            next_steps: card.next_steps.iter().map(StepRecord::from_domain).collect(),
            created_at: card.created_at,
        }
    }
}

//=========================================================================================
// `CardStoreService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CardStoreService for JsonCardStoreAdapter {
    /// Loads the full card list. A missing blob is an empty list, not an
    /// error; a corrupt blob is.
    async fn load(&self) -> PortResult<Vec<CoreCard>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };

        let records: Vec<CardRecord> =
            serde_json::from_str(&raw).map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(CardRecord::to_domain).collect())
    }

    /// Rewrites the whole blob from the given list.
    async fn save(&self, cards: &[CoreCard]) -> PortResult<()> {
        let records: Vec<CardRecord> = cards.iter().map(CardRecord::from_domain).collect();
        let raw = serde_json::to_string_pretty(&records)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
