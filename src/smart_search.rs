//! AI smart search over a hosted chat-completion API.
//!
//! [`SmartSearch`] is built once at startup from [`SearchConfig`] and shared
//! with the HTTP server. It is either
//!
//! - **Unconfigured**: no usable API key; every search returns
//!   [`NOT_CONFIGURED_MESSAGE`] without touching the network, or
//! - **Ready**: holds a [`ChatClient`] and sends one chat-completion request
//!   per search.
//!
//! [`SmartSearch::search`] never fails: provider errors are logged and turned
//! into a display string that carries the error detail. There is no retry.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::{Config, SearchConfig};

/// Returned for every search when the adapter has no credential.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Error: The AI Smart Search is not configured correctly. Please check the API key.";

const ERROR_PREFIX: &str =
    "Sorry, there was an error contacting the AI service. Please try again later.";

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant for the 'Patriot Pathways' website, \
a platform that helps US veterans.
Please provide a helpful and comprehensive response. If a user is asking for resources \
(like clinics, job centers, charities, etc.), please list them.
For each resource, if possible, provide its Name, a brief Description, and a Website or Phone Number.
Format your response cleanly using Markdown.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Minimal client for `POST {api_base}/chat/completions`.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

// The API key stays out of Debug output.
impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    pub fn new(config: &SearchConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    /// Sends `system` and `user` as a two-message conversation and returns
    /// the content of the first choice.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("chat completion API error {}: {}", status, body_text);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Invalid chat completion response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("chat completion response contained no choices"))?
            .message
            .content
            .unwrap_or_default();

        if content.trim().is_empty() {
            bail!("chat completion returned an empty message");
        }
        Ok(content)
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Unconfigured { reason: String },
    Ready(ChatClient),
}

/// The smart-search adapter handed to the HTTP layer.
#[derive(Debug, Clone)]
pub struct SmartSearch {
    backend: Backend,
}

impl SmartSearch {
    /// Reads the API key from the environment variable named in `config`.
    ///
    /// A missing or blank key, or a client that cannot be built, yields an
    /// unconfigured adapter. The reason is logged here, once.
    pub fn from_config(config: &SearchConfig) -> Self {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        let Some(key) = key else {
            let reason = format!("{} is not set", config.api_key_env);
            tracing::warn!(%reason, "AI smart search disabled");
            return Self::unconfigured(reason);
        };

        match ChatClient::new(config, key) {
            Ok(client) => {
                tracing::info!(model = client.model(), "AI smart search ready");
                Self::ready(client)
            }
            Err(e) => {
                tracing::warn!(error = %e, "AI smart search disabled");
                Self::unconfigured(e.to_string())
            }
        }
    }

    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unconfigured {
                reason: reason.into(),
            },
        }
    }

    pub fn ready(client: ChatClient) -> Self {
        Self {
            backend: Backend::Ready(client),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    /// Why the adapter is unconfigured, if it is.
    pub fn unconfigured_reason(&self) -> Option<&str> {
        match &self.backend {
            Backend::Unconfigured { reason } => Some(reason.as_str()),
            Backend::Ready(_) => None,
        }
    }

    /// Answer `query` with the model's Markdown response, or a
    /// user-facing error message. Always non-empty.
    pub async fn search(&self, query: &str) -> String {
        let client = match &self.backend {
            Backend::Unconfigured { .. } => return NOT_CONFIGURED_MESSAGE.to_string(),
            Backend::Ready(client) => client,
        };

        match client.complete(SYSTEM_PROMPT, query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "chat completion call failed");
                format!("{} Error: {:#}", ERROR_PREFIX, e)
            }
        }
    }
}

/// CLI entry point: runs one search and prints the raw response.
pub async fn run_ask(config: &Config, query: &str) -> Result<()> {
    let search = SmartSearch::from_config(&config.search);
    println!("{}", search.search(query).await);
    Ok(())
}
