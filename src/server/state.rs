//! Shared server state

use crate::inference::Recommender;

/// State shared across request handlers.
///
/// The recommender is immutable after startup, so no locking is needed.
pub struct AppState {
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self { recommender }
    }
}
