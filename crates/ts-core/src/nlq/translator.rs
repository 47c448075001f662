//! LLM-backed query translation.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. The system
//! prompt carries the full schema DDL so the model generates queries
//! against real tables and columns; the model's reply is unwrapped from
//! markdown fences and returned verbatim for the guard to judge.

use super::{NlqError, QueryTranslator};
use crate::db::SCHEMA_SQL;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the hosted text-generation model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider label (openai, or any compatible gateway).
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key.
    #[serde(default)]
    pub api_key: String,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens for the generated query.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; low by default so queries stay literal.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.1
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: String::new(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Translator backed by a hosted chat-completions model.
pub struct LlmTranslator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmTranslator {
    /// Creates a translator from configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client builds with static options");

        Self { client, config }
    }

    fn system_prompt() -> String {
        format!(
            "You are a SQL expert working with the incident-tracking database defined by \
             the following schema:\n\n{}\n\n\
             Convert the user's request to SQL.\n\
             - Use only table and column names present in the schema\n\
             - Return only the SQL query without any formatting or explanation\n\
             - Use standard SQL syntax\n\
             - Generate a single SELECT statement",
            SCHEMA_SQL
        )
    }
}

#[async_trait]
impl QueryTranslator for LlmTranslator {
    async fn translate(&self, question: &str) -> Result<String, NlqError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "system", "content": Self::system_prompt() },
                { "role": "user", "content": question },
            ],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NlqError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NlqError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NlqError::Service(format!("Failed to parse response: {}", e)))?;

        let text = value["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(NlqError::EmptyResponse)?;

        let sql = strip_sql_fences(text);
        debug!(sql = %sql, "Translated natural-language query");

        if sql.is_empty() {
            return Err(NlqError::EmptyResponse);
        }

        Ok(sql)
    }
}

/// Unwraps a model reply from markdown code fences, if present.
fn strip_sql_fences(text: &str) -> String {
    if let Some(start) = text.find("```sql") {
        let rest = &text[start + 6..];
        let end = rest.find("```").unwrap_or(rest.len());
        return rest[..end].trim().to_string();
    }
    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        let end = rest.find("```").unwrap_or(rest.len());
        return rest[..end].trim().to_string();
    }
    text.trim().to_string()
}

/// Values for the fixed incident INSERT template.
///
/// The rendered statement is returned to clients for display and audit;
/// the actual insert always goes through the parameterized repository
/// path.
#[derive(Debug, Clone)]
pub struct InsertTemplate {
    pub title: String,
    pub type_id: i64,
    pub severity_id: i64,
    pub system_id: i64,
    pub reporter_id: i64,
    pub status_id: i64,
    pub description: String,
}

/// Renders the fixed INSERT statement for an incident submission.
pub fn render_insert_template(template: &InsertTemplate) -> String {
    format!(
        "INSERT INTO incidents (incident_title, type_id, severity_id, system_id, reporter_id, \
         status_id, discovered_at, reported_at, description)\n\
         VALUES ('{}', {}, {}, {}, {}, {}, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP, '{}');",
        escape_literal(&template.title),
        template.type_id,
        template.severity_id,
        template.system_id,
        template.reporter_id,
        template.status_id,
        escape_literal(&template.description),
    )
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
