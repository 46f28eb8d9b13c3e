//! Application state wiring all services together.
//!
//! AppState pins the core generics to the concrete infra implementations
//! and is cloned into every handler.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use popmodel_core::auth::AdminTokens;
use popmodel_core::gateway::ChatGateway;
use popmodel_core::model::ModelState;
use popmodel_infra::auth::GoogleTokenVerifier;
use popmodel_infra::fs::memory::FsMemoryStore;
use popmodel_infra::fs::model_config::FsModelConfigStore;
use popmodel_infra::fs::session::FsSessionStore;
use popmodel_infra::llm::anthropic::AnthropicClient;
use popmodel_infra::spelling::WordListDictionary;
use popmodel_infra::tts::TtsClient;

use crate::http::rate_limit::RateLimiter;

/// Server configuration resolved from CLI flags and environment.
pub struct ServerConfig {
    pub api_key: Option<SecretString>,
    pub default_model: String,
    pub google_client_id: Option<String>,
    pub allow_insecure_noauth: bool,
    pub admin_code: String,
    pub data_dir: PathBuf,
}

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<FsSessionStore>,
    pub memory: Arc<FsMemoryStore>,
    /// `None` when no upstream API key is configured; the message endpoint
    /// answers 500 in that case while the rest of the API stays up.
    pub gateway: Option<Arc<ChatGateway<AnthropicClient>>>,
    pub models: Arc<ModelState<FsModelConfigStore>>,
    pub admin_tokens: Arc<AdminTokens>,
    /// `None` when identity verification is disabled; every request then
    /// maps to the anonymous namespace.
    pub verifier: Option<Arc<GoogleTokenVerifier>>,
    pub dictionary: Arc<WordListDictionary>,
    pub tts: Arc<TtsClient>,
    pub rate_limiter: Arc<RateLimiter>,
    pub admin_code: Arc<str>,
    pub client_id: Option<String>,
    pub default_model: String,
}

impl AppState {
    /// Initialize the application state: create the data directory, load
    /// the persisted model selection, wire services.
    pub async fn init(config: ServerConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let gateway = config
            .api_key
            .map(|key| Arc::new(ChatGateway::new(AnthropicClient::new(key))));
        if gateway.is_none() {
            tracing::warn!("no upstream API key configured; /api/message will be unavailable");
        }

        let models = ModelState::load(
            FsModelConfigStore::new(config.data_dir.clone()),
            config.default_model.clone(),
        )
        .await;

        let verifier = config
            .google_client_id
            .clone()
            .filter(|_| !config.allow_insecure_noauth)
            .map(|client_id| Arc::new(GoogleTokenVerifier::new(client_id)));
        if verifier.is_none() {
            tracing::warn!("identity verification disabled; all requests use the anon namespace");
        }

        Ok(Self {
            sessions: Arc::new(FsSessionStore::new(config.data_dir.clone())),
            memory: Arc::new(FsMemoryStore::new(config.data_dir.clone())),
            gateway,
            models: Arc::new(models),
            admin_tokens: Arc::new(AdminTokens::new()),
            verifier,
            dictionary: Arc::new(WordListDictionary::bundled()),
            tts: Arc::new(TtsClient::new()),
            rate_limiter: Arc::new(RateLimiter::default()),
            admin_code: Arc::from(config.admin_code.as_str()),
            client_id: config.google_client_id,
            default_model: config.default_model,
        })
    }

    /// Whether requests must carry a verified identity token.
    pub fn auth_required(&self) -> bool {
        self.verifier.is_some()
    }
}
