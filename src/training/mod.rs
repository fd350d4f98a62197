//! Training orchestration

mod trainer;

pub use trainer::{MetricsReport, Trainer, TrainerConfig};
