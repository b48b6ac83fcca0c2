//! Cache entry and statistics models.

/// A normalized upstream response stored under its request fingerprint.
///
/// Entries are created on the first successful dispatch for a key and are
/// read-only afterwards; failures are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The text extracted from the upstream response.
    pub text: String,
    /// True when extraction fell back to serializing the raw body because
    /// no known response shape matched.
    pub degraded: bool,
}

/// Statistics for cache operations.
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    /// Number of successful cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of stored entries.
    pub stores: u64,
}
