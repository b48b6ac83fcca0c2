//! Task façade: the entry points callers use to reach the upstream model.
//!
//! Every task runs the same pipeline: rate limiter first, then cache
//! lookup, then a single-flighted dispatch through the upstream client and
//! the response normalizer, then task-specific post-processing. Failures
//! are never cached; rate-limit rejections never reach the fault log.

use crate::cache::{fingerprint, CacheEntry, ResponseCache};
use crate::error::{GatewayError, Result};
use crate::faultlog::FaultLog;
use crate::gemini::{GenerateContentRequest, GeminiClient};
use crate::limiter::RateLimiter;
use crate::normalize::normalize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::warn;

const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Questions generated for a topic, plus the raw model reply they were
/// parsed from.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    pub questions: Vec<String>,
    pub raw_text: String,
}

pub struct TaskGateway {
    client: Arc<GeminiClient>,
    cache: ResponseCache,
    limiter: RateLimiter,
    fault_log: Arc<FaultLog>,
    // In-flight dispatches keyed by fingerprint, so concurrent identical
    // misses share one upstream call instead of each paying for their own.
    inflight: Mutex<HashMap<String, Arc<OnceCell<CacheEntry>>>>,
}

impl TaskGateway {
    pub fn new(
        client: Arc<GeminiClient>,
        cache: ResponseCache,
        limiter: RateLimiter,
        fault_log: Arc<FaultLog>,
    ) -> Self {
        Self {
            client,
            cache,
            limiter,
            fault_log,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Free-form generation; returns the normalized text verbatim.
    pub async fn generate(&self, caller: &str, prompt: &str) -> Result<String> {
        let entry = self.complete(caller, prompt, 512).await?;
        Ok(entry.text)
    }

    /// Summarize input into concise bullet points.
    pub async fn summarize(&self, caller: &str, text: &str) -> Result<String> {
        let prompt = format!(
            "Summarize the following feedback into concise bullet points:\n\n{}",
            text
        );
        let entry = self.complete(caller, &prompt, 150).await?;
        Ok(entry.text)
    }

    /// Classify sentiment, collapsing the reply to one of three canonical
    /// labels where possible.
    pub async fn classify_sentiment(&self, caller: &str, text: &str) -> Result<String> {
        let prompt = format!(
            "Classify the sentiment of the following text as Positive, Neutral, or Negative. \
             Return only one word: Positive, Neutral, or Negative.\n\nText:\n{}",
            text
        );
        let entry = self.complete(caller, &prompt, 64).await?;
        Ok(canonical_sentiment(&entry.text))
    }

    /// Generate interview questions for a topic, parsed into a list.
    pub async fn generate_questions(
        &self,
        caller: &str,
        topic: &str,
        difficulty: &str,
        count: usize,
    ) -> Result<QuestionSet> {
        let prompt = format!(
            "Generate {count} interview questions for a visa interview focusing on {topic}.\n\
             The questions should be at {difficulty} difficulty level and relevant to visa interviews.\n\
             Format the response as a numbered list.\n\
             Each question should be practical and help assess the candidate's preparation.\n\n\
             Topic: {topic}\n\
             Difficulty: {difficulty}\n\
             Number of questions: {count}"
        );
        let entry = self.complete(caller, &prompt, 1024).await?;
        Ok(QuestionSet {
            questions: parse_questions(&entry.text),
            raw_text: entry.text,
        })
    }

    /// Generate structured, constructive feedback from performance notes.
    pub async fn generate_feedback(&self, caller: &str, notes: &str) -> Result<String> {
        let prompt = format!(
            "Based on the following performance notes from a mock interview, provide constructive feedback.\n\
             The feedback should be:\n\
             1. Specific and actionable\n\
             2. Balanced (highlight both strengths and areas for improvement)\n\
             3. Professional and encouraging\n\
             4. Structured with clear sections\n\n\
             Performance notes: {notes}\n\n\
             Please structure your feedback with the following sections:\n\
             - Strengths\n\
             - Areas for Improvement\n\
             - Specific Recommendations\n\
             - Overall Assessment"
        );
        let entry = self.complete(caller, &prompt, 1024).await?;
        Ok(entry.text)
    }

    /// Current cache statistics, for the health endpoint.
    pub async fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats().await
    }

    /// The shared pipeline: limiter, cache, single-flighted dispatch.
    async fn complete(
        &self,
        caller: &str,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<CacheEntry> {
        if caller.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "caller identity must not be empty".to_string(),
            ));
        }
        if !self.limiter.admit(caller).await {
            // Expected control condition, not a fault: skip the error log.
            return Err(GatewayError::RateLimited);
        }

        let request =
            GenerateContentRequest::from_prompt(prompt, DEFAULT_TEMPERATURE, max_output_tokens);
        let key = fingerprint(self.client.model(), &serde_json::to_value(&request)?);

        if let Some(entry) = self.cache.get(&key).await {
            return Ok(entry);
        }

        let cell = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = cell
            .get_or_try_init(|| self.dispatch_and_store(&key, &request))
            .await
            .cloned();

        self.inflight.lock().await.remove(&key);
        result
    }

    async fn dispatch_and_store(
        &self,
        key: &str,
        request: &GenerateContentRequest,
    ) -> Result<CacheEntry> {
        let body = self.client.generate_content(request).await?;
        let normalized = normalize(&body);

        if normalized.degraded {
            // Soft failure: the caller still gets the serialized body, but
            // the event is recorded for alerting on upstream schema drift.
            warn!("unexpected upstream response shape, returning serialized body");
            self.fault_log
                .record(&GatewayError::UnexpectedShape(truncate(&normalized.text, 512)).to_string())
                .await;
        }

        let entry = CacheEntry {
            text: normalized.text,
            degraded: normalized.degraded,
        };
        self.cache.put(key.to_string(), entry.clone()).await;
        Ok(entry)
    }
}

/// Collapse a sentiment reply to a canonical label: first line, trimmed,
/// case-insensitive prefix match. Unmatched output passes through unchanged
/// so callers can detect anomalies.
fn canonical_sentiment(raw: &str) -> String {
    let first_line = raw.lines().next().unwrap_or("").trim();
    let lower = first_line.to_lowercase();

    if lower.starts_with("pos") {
        "Positive".to_string()
    } else if lower.starts_with("neg") {
        "Negative".to_string()
    } else if lower.starts_with("neu") {
        "Neutral".to_string()
    } else {
        first_line.to_string()
    }
}

/// Pull individual questions out of a numbered or bulleted model reply.
fn parse_questions(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let first = line.chars().next()?;
            if !(first.is_ascii_digit() || first == '-' || first == '•') {
                return None;
            }
            let cleaned = if first.is_ascii_digit() {
                line.split_once('.').map(|(_, rest)| rest).unwrap_or(line)
            } else {
                line.trim_start_matches(['-', '•'])
            };
            let cleaned = cleaned.trim();
            (!cleaned.is_empty()).then(|| cleaned.to_string())
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}
