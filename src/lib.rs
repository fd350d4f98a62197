//! Incentive Recommender - training and serving for incentive program
//! recommendations
//!
//! This crate turns three tabular sources (incentive catalog, property
//! attributes, owner behavior) into a single training frame, fits a
//! classifier over it, and serves single-request recommendations with a
//! guaranteed training/serving consistency contract: the fitted feature
//! pipeline, the frozen feature column order, and the catalog constants
//! all travel inside one model bundle.
//!
//! # Modules
//!
//! - [`pipeline`] - Schema validation, cleaning, and feature engineering
//! - [`preprocessing`] - Scaling and one-hot encoding
//! - [`model`] - Decision tree and random forest classifiers, metrics
//! - [`training`] - Stratified split and trainer orchestration
//! - [`artifact`] - Model bundle persistence
//! - [`inference`] - Single-request recommendation over a loaded bundle
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data pipeline
pub mod pipeline;
pub mod preprocessing;

// Modeling
pub mod model;
pub mod training;

// Persistence and serving
pub mod artifact;
pub mod inference;
pub mod server;
pub mod cli;

pub use error::{RecommenderError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{RecommenderError, Result};

    // Pipeline
    pub use crate::pipeline::{
        build_features, build_training_dataset, clean_table, clean_tables, GlobalIncentiveStats,
        TrainingDataset, TARGET_COLUMN,
    };

    // Preprocessing
    pub use crate::preprocessing::{FeaturePipeline, OneHotEncoder, StandardScaler};

    // Modeling
    pub use crate::model::{
        Classifier, ClassifierModel, DecisionTreeClassifier, ModelType, RandomForestClassifier,
    };

    // Training
    pub use crate::training::{MetricsReport, Trainer, TrainerConfig};

    // Persistence and serving
    pub use crate::artifact::ModelBundle;
    pub use crate::inference::{Recommendation, Recommender};
    pub use crate::server::{run_server, ServerConfig};
}
