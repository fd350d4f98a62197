//! Model bundle persistence
//!
//! Everything a serving process needs to reproduce training-time
//! transformations lives in one JSON artifact: the fitted feature
//! pipeline, the trained model, the frozen feature column order, the
//! class names, and the incentive-catalog constants.

use crate::error::{RecommenderError, Result};
use crate::model::ClassifierModel;
use crate::pipeline::GlobalIncentiveStats;
use crate::preprocessing::FeaturePipeline;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub pipeline: FeaturePipeline,
    pub model: ClassifierModel,
    /// Raw feature columns in frozen merge order.
    pub feature_columns: Vec<String>,
    pub target_column: String,
    /// Class names in index order; predictions index into this.
    pub classes: Vec<String>,
    pub global_stats: GlobalIncentiveStats,
}

impl ModelBundle {
    /// Write the bundle as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "model bundle saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecommenderError::ArtifactNotFound(
                path.display().to_string(),
            ));
        }
        let json = fs::read_to_string(path)?;
        let bundle: Self = serde_json::from_str(&json)?;
        info!(
            path = %path.display(),
            n_features = bundle.feature_columns.len(),
            n_classes = bundle.classes.len(),
            "model bundle loaded"
        );
        Ok(bundle)
    }
}
