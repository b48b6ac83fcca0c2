// Response cache - deduplicates identical upstream requests

mod manager;
mod models;

pub use manager::{fingerprint, ResponseCache};
pub use models::{CacheEntry, CacheStats};
