//! Model catalog and process-wide current-model state.
//!
//! The catalog is the allow-listed set exposed to clients, each entry
//! carrying a friendly display label. Clients may select a model by
//! canonical id or by label; [`resolve`] normalizes both to the canonical
//! id in one place at the boundary.

use tokio::sync::RwLock;
use tracing::{info, warn};

use popmodel_types::error::StoreError;
use popmodel_types::model::ModelOption;

use crate::store::ModelConfigStore;

/// Model used for admin-mode requests: faster and cheaper than the default.
pub const ADMIN_MODEL: &str = "claude-3-5-sonnet-latest";

/// Fixed ordered fallback candidates tried when the current model is
/// reported missing upstream.
pub const FALLBACK_MODELS: &[&str] = &[
    "claude-3-5-sonnet-latest",
    "claude-3-opus-20240229",
    "claude-3-5-haiku-latest",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
];

/// The allow-listed catalog shown by `/api/models`.
pub fn catalog() -> Vec<ModelOption> {
    vec![
        ModelOption {
            id: "claude-3-haiku-20240307".to_string(),
            label: "pop v1".to_string(),
        },
        ModelOption {
            id: "claude-3-sonnet-20240229".to_string(),
            label: "pop v1.5".to_string(),
        },
        ModelOption {
            id: "claude-3-5-sonnet-latest".to_string(),
            label: "pop v2".to_string(),
        },
    ]
}

/// Normalize a client-supplied model (canonical id or display label) to
/// its canonical id. `None` when the input is not in the allow-list.
pub fn resolve(input: &str) -> Option<String> {
    let input = input.trim();
    if input.len() < 3 {
        return None;
    }
    for option in catalog() {
        if option.id == input || option.label.eq_ignore_ascii_case(input) {
            return Some(option.id);
        }
    }
    None
}

/// Process-wide current-model selection.
///
/// A single `RwLock` guards the selection; [`switch`](ModelState::switch)
/// persists through the config store while holding the write guard so
/// concurrent fallback attempts cannot interleave a lost update.
pub struct ModelState<S: ModelConfigStore> {
    current: RwLock<String>,
    default_model: String,
    store: S,
}

impl<S: ModelConfigStore> ModelState<S> {
    /// Load the persisted selection, falling back to `default_model`.
    pub async fn load(store: S, default_model: String) -> Self {
        let current = match store.load().await {
            Ok(Some(model)) if !model.trim().is_empty() => model.trim().to_string(),
            Ok(_) => default_model.clone(),
            Err(err) => {
                warn!(error = %err, "could not read model config, using default");
                default_model.clone()
            }
        };
        Self {
            current: RwLock::new(current),
            default_model,
            store,
        }
    }

    /// The model configured at startup (before any runtime switches).
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// The currently selected model.
    pub async fn current(&self) -> String {
        self.current.read().await.clone()
    }

    /// Switch the current model and persist the selection.
    pub async fn switch(&self, model: &str) -> Result<(), StoreError> {
        let mut guard = self.current.write().await;
        self.store.save(model).await?;
        *guard = model.to_string();
        info!(model = %model, "current model switched");
        Ok(())
    }

    /// Reset a persisted selection that fell off the allow-list back to the
    /// first catalog entry. Returns the (possibly corrected) current model.
    pub async fn ensure_allowed(&self) -> String {
        let current = self.current().await;
        if catalog().iter().any(|m| m.id == current) {
            return current;
        }
        let fallback = catalog()[0].id.clone();
        warn!(model = %current, reset_to = %fallback, "persisted model no longer allow-listed");
        if let Err(err) = self.switch(&fallback).await {
            warn!(error = %err, "could not persist model reset");
            *self.current.write().await = fallback.clone();
        }
        fallback
    }
}
