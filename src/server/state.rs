use std::sync::Arc;

use crate::domain::traits::SentimentPredictor;

/// Shared by every request handler. Cloning only bumps the Arc.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn SentimentPredictor>,
}

impl AppState {
    pub fn new(predictor: Arc<dyn SentimentPredictor>) -> Self {
        Self { predictor }
    }
}
