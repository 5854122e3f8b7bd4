//! Response envelopes returned by every tool
//!
//! An envelope is built once per invocation and rendered to text exactly
//! once; success payloads are pretty-printed JSON, errors are a plain message.

use crate::error::InfraError;
use crate::resource::Resource;
use serde::Serialize;

/// Prefix marking a message as an infrastructure-query failure.
pub const FAILURE_PREFIX: &str = "AWS query failed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub title: String,
    pub resources: Vec<Resource>,
}

/// Per-kind counts reported by `account-summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct AccountSummary {
    pub compute_count: usize,
    pub storage_count: usize,
    pub database_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    Listing(Listing),
    Summary(AccountSummary),
    Error { message: String },
}

impl ResponseEnvelope {
    pub fn success(title: impl Into<String>, resources: Vec<Resource>) -> Self {
        ResponseEnvelope::Listing(Listing {
            title: title.into(),
            resources,
        })
    }

    pub fn summary(summary: AccountSummary) -> Self {
        ResponseEnvelope::Summary(summary)
    }

    pub fn error(message: impl Into<String>) -> Self {
        ResponseEnvelope::Error {
            message: message.into(),
        }
    }

    pub fn failure(err: &InfraError) -> Self {
        Self::error(translate_failure(err))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseEnvelope::Error { .. })
    }

    /// Text carried in the response's single content block.
    pub fn render(&self) -> String {
        match self {
            ResponseEnvelope::Listing(listing) => pretty(listing),
            ResponseEnvelope::Summary(summary) => pretty(summary),
            ResponseEnvelope::Error { message } => message.clone(),
        }
    }

    pub fn into_tool_result(self) -> ToolResult {
        ToolResult {
            content: vec![ContentBlock::text(self.render())],
            is_error: self.is_error(),
        }
    }
}

fn pretty<T: Serialize>(payload: &T) -> String {
    serde_json::to_string_pretty(payload)
        .unwrap_or_else(|e| format!("{}: could not render response: {}", FAILURE_PREFIX, e))
}

/// Display message for a caught failure. Total over [`InfraError`].
///
/// Service rejections surface the provider's own code and message; every
/// other kind surfaces the failure's display text.
pub fn translate_failure(err: &InfraError) -> String {
    let detail = match err {
        InfraError::Service { code, message, .. } => {
            let code = code.as_deref().filter(|c| !c.is_empty());
            let message = message.as_deref().filter(|m| !m.is_empty());
            match (code, message) {
                (Some(code), Some(message)) if !message.starts_with(code) => {
                    format!("{}: {}", code, message)
                }
                (_, Some(message)) => message.to_string(),
                (Some(code), None) => code.to_string(),
                (None, None) => err.to_string(),
            }
        }
        other => other.to_string(),
    };
    format!("{}: {}", FAILURE_PREFIX, detail)
}

/// MCP `tools/call` result body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}
