pub mod card_store;
pub mod fetch;
pub mod summary_llm;

pub use card_store::JsonCardStoreAdapter;
pub use fetch::HttpFetchAdapter;
pub use summary_llm::GeminiSummaryAdapter;
