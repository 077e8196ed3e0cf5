pub mod domain;
pub mod ports;

pub use domain::{CoreCard, ExtractionResult, MediaKind, Step, SummaryRecord};
pub use ports::{
    CardStoreService, ContentFetchService, GenerativeService, PortError, PortResult,
};
