//! Binary entrypoint for the civic issue reporter API.
use std::sync::Arc;

use civic_api::{run, ApiConfig, AppState};
use civic_vision::{GeminiConfig, GeminiVision, ImageAnalyzer};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = ApiConfig::from_env();
    let analyzer = build_analyzer(&config);
    if analyzer.is_none() {
        tracing::warn!(
            "GEMINI_API_KEY is not set; /analyze will return 503 until it is configured"
        );
    }

    let state = AppState::new(analyzer);
    run(&config.addr, state).await;
}

fn build_analyzer(config: &ApiConfig) -> Option<Arc<dyn ImageAnalyzer>> {
    let api_key = config.gemini_api_key.as_ref()?;
    let mut gemini = match GeminiConfig::new(api_key) {
        Ok(cfg) => cfg.with_timeout(config.vision_timeout),
        Err(err) => {
            tracing::error!(error = %err, "gemini config invalid");
            return None;
        }
    };
    if let Some(model) = &config.gemini_model {
        gemini = gemini.with_model(model);
    }
    if let Some(base) = &config.gemini_base_url {
        gemini = match gemini.with_base_url(base) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::error!(error = %err, "GEMINI_BASE_URL invalid");
                return None;
            }
        };
    }
    match GeminiVision::new(gemini) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            tracing::error!(error = %err, "gemini client build failed");
            None
        }
    }
}
