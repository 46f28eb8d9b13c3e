//! File-backed [`ModelConfigStore`]: the current-model selection survives
//! restarts in `popmodel.config.json`.

use std::path::PathBuf;

use popmodel_core::store::ModelConfigStore;
use popmodel_types::error::StoreError;
use popmodel_types::model::ModelConfig;

use super::config_path;

#[derive(Debug, Clone)]
pub struct FsModelConfigStore {
    data_dir: PathBuf,
}

impl FsModelConfigStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

impl ModelConfigStore for FsModelConfigStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        let path = config_path(&self.data_dir);
        let config: Option<ModelConfig> = super::read_json(&path).await?;
        Ok(config.map(|c| c.model).filter(|m| !m.trim().is_empty()))
    }

    async fn save(&self, model: &str) -> Result<(), StoreError> {
        let path = config_path(&self.data_dir);
        let config = ModelConfig {
            model: model.to_string(),
        };
        super::write_json(&path, &config).await
    }
}
