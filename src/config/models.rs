//! Configuration data structures for the gemgate gateway.
//!
//! This module defines the schema for the application settings, including
//! server parameters, upstream Gemini API specifics, rate limiting, and the
//! response cache.

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Per-caller rate limiting settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads for the Axum server.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Settings for the upstream Generative Language API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header. Absent or empty means
    /// the gateway refuses to dispatch.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the Generative Language API.
    /// Default: the public v1beta endpoint.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model identifier appended to the base URL.
    /// Default: `models/gemini-2.5-flash`
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Path of the append-only error log for failed upstream calls.
    /// Default: `api_errors.log`
    #[serde(default = "default_error_log_path")]
    pub error_log_path: String,
}

/// Settings for the sliding-window rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Length of the trailing window, in seconds.
    /// Default: `60`
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Maximum admitted requests per caller within the window.
    /// Default: `10`
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
}

/// Settings for the response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached responses before least-recently-used
    /// entries are evicted.
    /// Default: `1024`
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            error_log_path: default_error_log_path(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            max_requests: default_max_requests(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "models/gemini-2.5-flash".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_error_log_path() -> String {
    "api_errors.log".to_string()
}

fn default_window_seconds() -> u64 {
    60
}

fn default_max_requests() -> usize {
    10
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
