//! Shared application state
use civic_store::ComplaintStore;
use civic_vision::ImageAnalyzer;
use std::sync::Arc;

/// State handed to every handler. The store owns the complaint
/// collection exclusively; the analyzer is absent when no API key is
/// configured, in which case /analyze fails fast with a config error.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ComplaintStore>,
    pub analyzer: Option<Arc<dyn ImageAnalyzer>>,
}

impl AppState {
    pub fn new(analyzer: Option<Arc<dyn ImageAnalyzer>>) -> Self {
        Self {
            store: Arc::new(ComplaintStore::new()),
            analyzer,
        }
    }

    pub fn api_key_configured(&self) -> bool {
        self.analyzer.is_some()
    }
}
