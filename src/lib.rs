// gemgate - Rate-limited, caching gateway to the Google Generative Language API

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod faultlog;
pub mod gemini;
pub mod limiter;
pub mod normalize;
pub mod server;
pub mod tasks;
pub mod utils;
