//! services/api/src/web/state.rs
//!
//! Defines the application's shared state: the summary pipeline, the card
//! store port, and the in-memory card list the store persists.

use crate::config::Config;
use crate::web::summary_task::SummaryPipeline;
use corepick_core::domain::CoreCard;
use corepick_core::ports::{CardStoreService, PortError, PortResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: SummaryPipeline,
    store: Arc<dyn CardStoreService>,
    /// The working copy of the persisted card list, most recent card first.
    cards: RwLock<Vec<CoreCard>>,
}

impl AppState {
    /// Builds the state, loading the persisted card list once.
    pub async fn new(
        config: Arc<Config>,
        pipeline: SummaryPipeline,
        store: Arc<dyn CardStoreService>,
    ) -> PortResult<Self> {
        let cards = store.load().await?;
        Ok(Self {
            config,
            pipeline,
            store,
            cards: RwLock::new(cards),
        })
    }

    /// Returns a snapshot of the card list, most recent first.
    pub async fn list_cards(&self) -> Vec<CoreCard> {
        self.cards.read().await.clone()
    }

    // Mutations are staged on a copy and committed to the lock only after a
    // successful save; the in-memory list never runs ahead of the store.

    /// Prepends a card to the list and rewrites the store. A failed save
    /// leaves the list unchanged.
    pub async fn add_card(&self, card: CoreCard) -> PortResult<CoreCard> {
        let mut cards = self.cards.write().await;
        let mut updated = cards.clone();
        updated.insert(0, card.clone());
        self.store.save(&updated).await?;
        *cards = updated;
        Ok(card)
    }

    /// Removes a card by id and rewrites the store. A failed save leaves the
    /// list unchanged.
    pub async fn delete_card(&self, card_id: Uuid) -> PortResult<()> {
        let mut cards = self.cards.write().await;
        let mut updated = cards.clone();
        updated.retain(|card| card.id != card_id);
        if updated.len() == cards.len() {
            return Err(PortError::NotFound(format!("Card {} not found", card_id)));
        }
        self.store.save(&updated).await?;
        *cards = updated;
        Ok(())
    }

    /// Flips one step's completion flag and rewrites the store. Returns the
    /// updated card. A failed save leaves the list unchanged.
    pub async fn toggle_step(&self, card_id: Uuid, step_id: Uuid) -> PortResult<CoreCard> {
        let mut cards = self.cards.write().await;
        let mut updated = cards.clone();
        let card = updated
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| PortError::NotFound(format!("Card {} not found", card_id)))?;

        if !card.toggle_step(step_id) {
            return Err(PortError::NotFound(format!(
                "Step {} not found on card {}",
                step_id, card_id
            )));
        }

        let toggled = card.clone();
        self.store.save(&updated).await?;
        *cards = updated;
        Ok(toggled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use corepick_core::domain::{MediaKind, Step};
    use corepick_core::ports::{ContentFetchService, GenerativeService};
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tracing::Level;

    /// Store stub that records what was last saved. Writes can be made to
    /// fail to exercise save-failure handling.
    struct MemoryStore {
        initial: Vec<CoreCard>,
        saved: Mutex<Option<Vec<CoreCard>>>,
        fail_saves: bool,
    }

    impl MemoryStore {
        fn empty() -> Self {
            Self {
                initial: Vec::new(),
                saved: Mutex::new(None),
                fail_saves: false,
            }
        }

        fn failing_with(initial: Vec<CoreCard>) -> Self {
            Self {
                initial,
                saved: Mutex::new(None),
                fail_saves: true,
            }
        }

        fn last_saved(&self) -> Option<Vec<CoreCard>> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CardStoreService for MemoryStore {
        async fn load(&self) -> PortResult<Vec<CoreCard>> {
            Ok(self.initial.clone())
        }

        async fn save(&self, cards: &[CoreCard]) -> PortResult<()> {
            if self.fail_saves {
                return Err(PortError::Unexpected("disk full".to_string()));
            }
            *self.saved.lock().unwrap() = Some(cards.to_vec());
            Ok(())
        }
    }

    /// Fetch stub for wiring; the state tests never hit the network.
    struct NullFetcher;

    #[async_trait]
    impl ContentFetchService for NullFetcher {
        async fn fetch_page(&self, url: &str, _kind: MediaKind) -> PortResult<String> {
            Err(PortError::Fetch(format!("no network in tests: {}", url)))
        }

        async fn fetch_video_title(&self, url: &str) -> PortResult<String> {
            Err(PortError::Fetch(format!("no network in tests: {}", url)))
        }
    }

    struct NullModel;

    #[async_trait]
    impl GenerativeService for NullModel {
        async fn generate(&self, _prompt: &str) -> PortResult<String> {
            Err(PortError::Unexpected("no model in tests".to_string()))
        }
    }

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            bind_address: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
            log_level: Level::INFO,
            gemini_api_key: None,
            gemini_api_base: "http://localhost/v1".to_string(),
            summary_model: "test-model".to_string(),
            card_store_path: PathBuf::from("unused.json"),
        })
    }

    async fn test_state(store: Arc<MemoryStore>) -> AppState {
        let pipeline = SummaryPipeline::new(Arc::new(NullFetcher), Arc::new(NullModel));
        AppState::new(test_config(), pipeline, store)
            .await
            .unwrap()
    }

    fn card(title: &str) -> CoreCard {
        CoreCard::new(
            format!("https://example.com/{}", title),
            title.to_string(),
            vec!["要点".to_string()],
            Step::sequence_from_contents(vec!["やってみる".to_string()]),
        )
    }

    #[tokio::test]
    async fn add_card_prepends_and_persists() {
        let store = Arc::new(MemoryStore::empty());
        let state = test_state(store.clone()).await;

        state.add_card(card("first")).await.unwrap();
        state.add_card(card("second")).await.unwrap();

        let cards = state.list_cards().await;
        assert_eq!(cards[0].title, "second");
        assert_eq!(cards[1].title, "first");
        assert_eq!(store.last_saved().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_card_removes_and_persists() {
        let store = Arc::new(MemoryStore::empty());
        let state = test_state(store.clone()).await;

        let kept = state.add_card(card("kept")).await.unwrap();
        let dropped = state.add_card(card("dropped")).await.unwrap();

        state.delete_card(dropped.id).await.unwrap();
        let cards = state.list_cards().await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, kept.id);
        assert_eq!(store.last_saved().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_card_with_unknown_id_is_not_found() {
        let state = test_state(Arc::new(MemoryStore::empty())).await;
        let result = state.delete_card(Uuid::new_v4()).await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }

    #[tokio::test]
    async fn toggle_step_flips_and_persists() {
        let store = Arc::new(MemoryStore::empty());
        let state = test_state(store.clone()).await;

        let added = state.add_card(card("with-step")).await.unwrap();
        let step_id = added.next_steps[0].id;

        let updated = state.toggle_step(added.id, step_id).await.unwrap();
        assert!(updated.next_steps[0].is_completed);
        assert_eq!(updated.next_steps[0].id, step_id);

        let saved = store.last_saved().unwrap();
        assert!(saved[0].next_steps[0].is_completed);

        let reverted = state.toggle_step(added.id, step_id).await.unwrap();
        assert!(!reverted.next_steps[0].is_completed);
    }

    #[tokio::test]
    async fn a_failed_save_leaves_the_list_unchanged() {
        let existing = card("既存");
        let step_id = existing.next_steps[0].id;
        let store = Arc::new(MemoryStore::failing_with(vec![existing.clone()]));
        let state = test_state(store).await;

        assert!(state.add_card(card("new")).await.is_err());
        assert!(state.delete_card(existing.id).await.is_err());
        assert!(state.toggle_step(existing.id, step_id).await.is_err());

        assert_eq!(state.list_cards().await, vec![existing]);
    }

    #[tokio::test]
    async fn toggle_step_with_unknown_ids_is_not_found() {
        let state = test_state(Arc::new(MemoryStore::empty())).await;
        let added = state.add_card(card("c")).await.unwrap();

        let missing_card = state.toggle_step(Uuid::new_v4(), added.next_steps[0].id).await;
        assert!(matches!(missing_card, Err(PortError::NotFound(_))));

        let missing_step = state.toggle_step(added.id, Uuid::new_v4()).await;
        assert!(matches!(missing_step, Err(PortError::NotFound(_))));
    }
}
