//! Upstream model gateway with model-not-found fallback.
//!
//! Translates an internal chat turn into an upstream request, sends it to
//! the configured model, and on a model-not-found rejection retries a
//! fixed ordered list of alternate models. The first candidate that
//! succeeds becomes the process-wide current model and the reply is
//! annotated with a note describing the substitution.
//!
//! No other error class is retried: remaining 4xx responses are surfaced
//! to the caller with upstream detail, 5xx and transport failures as a
//! generic upstream error.

use tracing::warn;

use popmodel_types::chat::{ChatReply, ContentBlock, ImageInput, UpstreamRequest};
use popmodel_types::error::UpstreamError;

use crate::model::{FALLBACK_MODELS, ModelState};
use crate::store::ModelConfigStore;

/// System banner prepended for admin-mode requests.
const ADMIN_BANNER: &str =
    "You are in pop.ai Admin/Dev mode. Greet the user as Admin/Dev. Be concise and fast.";

/// Output token bounds and defaults.
const MIN_MAX_TOKENS: u32 = 128;
const MAX_MAX_TOKENS: u32 = 4096;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const ADMIN_DEFAULT_MAX_TOKENS: u32 = 512;

/// One inbound chat turn, after spelling correction and memory lookup.
#[derive(Debug, Clone, Default)]
pub struct ChatTurn {
    /// Spelling-corrected message text. May be empty when images carry
    /// the whole request.
    pub text: String,
    pub images: Vec<ImageInput>,
    /// Caller-supplied system prompt override.
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub admin: bool,
    /// Memory-derived context block, rendered by `memory::memory_context`.
    pub memory_context: Option<String>,
}

/// Sends a composed request to the upstream model API.
///
/// Returns the reply text on 2xx (with the provider's empty-content
/// placeholder already substituted). Error variants carry the
/// classification the gateway branches on.
pub trait UpstreamClient: Send + Sync {
    fn send(
        &self,
        model: &str,
        request: &UpstreamRequest,
    ) -> impl std::future::Future<Output = Result<String, UpstreamError>> + Send;
}

/// The upstream model gateway.
pub struct ChatGateway<C: UpstreamClient> {
    client: C,
}

impl<C: UpstreamClient> ChatGateway<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Compose the outbound request from a chat turn.
    ///
    /// Validates that at least one content block exists, clamps sampling
    /// parameters, and assembles the system prompt in the documented
    /// order: admin banner, caller system text, memory context.
    pub fn compose(turn: &ChatTurn) -> Result<UpstreamRequest, UpstreamError> {
        let mut content = Vec::new();
        let text = turn.text.trim();
        if !text.is_empty() {
            content.push(ContentBlock::Text {
                text: text.to_string(),
            });
        }
        content.extend(turn.images.iter().filter_map(ImageInput::to_block));
        if content.is_empty() {
            return Err(UpstreamError::EmptyContent);
        }

        let default_max = if turn.admin {
            ADMIN_DEFAULT_MAX_TOKENS
        } else {
            DEFAULT_MAX_TOKENS
        };
        let max_tokens = turn
            .max_tokens
            .unwrap_or(default_max)
            .clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS);
        let temperature = turn.temperature.map(|t| t.clamp(0.0, 1.0));

        let mut segments = Vec::new();
        if turn.admin {
            segments.push(ADMIN_BANNER.to_string());
        }
        if let Some(system) = turn.system.as_deref() {
            let system = system.trim();
            if !system.is_empty() {
                segments.push(system.to_string());
            }
        }
        if let Some(context) = turn.memory_context.as_deref() {
            if !context.is_empty() {
                segments.push(context.to_string());
            }
        }
        let system = if segments.is_empty() {
            None
        } else {
            Some(segments.join("\n\n"))
        };

        Ok(UpstreamRequest {
            system,
            content,
            max_tokens,
            temperature,
        })
    }

    /// Send one chat turn, retrying across fallback models when the
    /// current model is reported missing upstream.
    ///
    /// On a fallback success the winning candidate is persisted as the
    /// process-wide current model; a persist failure is logged but does
    /// not fail the already-obtained reply.
    pub async fn send<S: ModelConfigStore>(
        &self,
        turn: &ChatTurn,
        models: &ModelState<S>,
    ) -> Result<ChatReply, UpstreamError> {
        let request = Self::compose(turn)?;
        let model = if turn.admin {
            crate::model::ADMIN_MODEL.to_string()
        } else {
            models.current().await
        };

        match self.client.send(&model, &request).await {
            Ok(reply) => Ok(ChatReply {
                reply,
                note: None,
                model,
            }),
            Err(UpstreamError::ModelNotFound { .. }) => {
                self.fallback(&model, &request, models).await
            }
            Err(err) => Err(err),
        }
    }

    /// Try each fallback candidate in order, excluding the model that
    /// just failed.
    async fn fallback<S: ModelConfigStore>(
        &self,
        failed_model: &str,
        request: &UpstreamRequest,
        models: &ModelState<S>,
    ) -> Result<ChatReply, UpstreamError> {
        let candidates: Vec<&str> = FALLBACK_MODELS
            .iter()
            .copied()
            .filter(|m| *m != failed_model)
            .collect();

        for candidate in &candidates {
            match self.client.send(candidate, request).await {
                Ok(reply) => {
                    if let Err(err) = models.switch(candidate).await {
                        warn!(model = %candidate, error = %err, "could not persist fallback model");
                    }
                    let note = format!(
                        "Model '{failed_model}' was not available. Auto-switched to '{candidate}'."
                    );
                    return Ok(ChatReply {
                        reply,
                        note: Some(note),
                        model: candidate.to_string(),
                    });
                }
                Err(err) => {
                    warn!(model = %candidate, error = %err, "fallback candidate failed");
                }
            }
        }

        Err(UpstreamError::ModelNotFound {
            model: failed_model.to_string(),
            attempted: candidates.iter().map(|s| s.to_string()).collect(),
        })
    }
}
