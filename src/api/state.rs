use std::sync::Arc;

use crate::scorer::DetectionScorer;
use crate::storage::Pool;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    /// Unset when no scorer endpoint is configured; the image ingest route
    /// then answers 503.
    pub scorer: Option<Arc<dyn DetectionScorer>>,
}

impl AppState {
    pub fn new(pool: Pool, scorer: Option<Arc<dyn DetectionScorer>>) -> Self {
        Self { pool, scorer }
    }
}
