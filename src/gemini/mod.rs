// Upstream Generative Language API integration

mod client;
mod models;

pub use client::GeminiClient;
pub use models::{Content, GenerateContentRequest, GenerationConfig, Part};
