//! Application state.

use std::sync::Arc;

use ideabrowser_core::AnalysisRunner;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<dyn AnalysisRunner>,
}

impl AppState {
    pub fn new(runner: Arc<dyn AnalysisRunner>) -> Self {
        Self { runner }
    }
}
