// HTTP request handlers

use super::routes::AppState;
use crate::error::{GatewayError, Result};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::info;

/// Inbound task request from the web/CLI layer.
///
/// Task-specific payload fields are flat and optional; each task validates
/// the fields it needs.
#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub task: TaskKind,

    /// Opaque caller identity used as the rate-limiter key.
    #[serde(alias = "user_id", alias = "callerIdentity")]
    pub caller_id: String,

    pub prompt: Option<String>,
    pub text: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub count: Option<usize>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Generate,
    Summarize,
    ClassifySentiment,
    GenerateQuestions,
    GenerateFeedback,
}

pub async fn llm_tasks_handler(
    State(state): State<AppState>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<Value>> {
    info!(task = ?req.task, caller = %req.caller_id, "received task request");

    let gateway = &state.gateway;
    let caller = &req.caller_id;

    let body = match req.task {
        TaskKind::Generate => {
            let prompt = required(req.prompt, "prompt is required for text generation")?;
            let generated = gateway.generate(caller, &prompt).await?;
            json!({ "generated_text": generated })
        }
        TaskKind::Summarize => {
            let text = required(req.text, "text is required for summarization")?;
            let summary = gateway.summarize(caller, &text).await?;
            json!({ "summary": summary })
        }
        TaskKind::ClassifySentiment => {
            let text = required(req.text, "text is required for sentiment analysis")?;
            let sentiment = gateway.classify_sentiment(caller, &text).await?;
            json!({ "sentiment": sentiment })
        }
        TaskKind::GenerateQuestions => {
            let topic = required(req.topic, "topic is required for question generation")?;
            let difficulty = req.difficulty.unwrap_or_else(|| "medium".to_string());
            let count = req.count.unwrap_or(5);
            let set = gateway
                .generate_questions(caller, &topic, &difficulty, count)
                .await?;
            json!({ "questions": set.questions, "raw_text": set.raw_text })
        }
        TaskKind::GenerateFeedback => {
            let notes = required(req.notes, "notes are required for feedback generation")?;
            let feedback = gateway.generate_feedback(caller, &notes).await?;
            json!({ "feedback": feedback })
        }
    };

    Ok(Json(body))
}

fn required(field: Option<String>, message: &str) -> Result<String> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| GatewayError::InvalidRequest(message.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // Check credential presence
    let has_key = state
        .config
        .gemini
        .api_key
        .as_deref()
        .is_some_and(|k| !k.is_empty());
    let credential_check = if has_key {
        HealthCheck {
            status: "ok".to_string(),
            message: "API key configured".to_string(),
        }
    } else {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: "No API key configured; dispatches will fail".to_string(),
        }
    };
    checks.insert("credential".to_string(), credential_check);

    // Check configuration
    checks.insert(
        "configuration".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!(
                "API base: {}, model: {}",
                state.config.gemini.api_base_url, state.config.gemini.model
            ),
        },
    );

    // Cache statistics
    let stats = state.gateway.cache_stats().await;
    checks.insert(
        "cache".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!(
                "hits: {}, misses: {}, stores: {}",
                stats.hits, stats.misses, stats.stores
            ),
        },
    );

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
