//! Model selection types.

use serde::{Deserialize, Serialize};

/// Allow-listed model exposed to clients, with its friendly display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    pub id: String,
    pub label: String,
}

/// Durable model selection, persisted as one pretty-printed JSON document
/// so the choice survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_config_round_trips() {
        let cfg = ModelConfig {
            model: "claude-3-5-sonnet-latest".to_string(),
        };
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let back: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.model, cfg.model);
    }
}
