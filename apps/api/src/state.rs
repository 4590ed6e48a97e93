use std::sync::Arc;

use crate::config::Config;
use crate::generation::batch::BatchOrchestrator;
use crate::generation::generator::ResumeGenerator;
use crate::llm_client::{CompletionTransport, GenerationClient};
use crate::render::DocumentRenderer;
use crate::stats::ServiceStats;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ResumeGenerator>,
    pub batch: BatchOrchestrator,
    /// Markdown → PDF. Cheap to clone; moved into blocking tasks per request.
    pub renderer: DocumentRenderer,
    pub stats: Arc<ServiceStats>,
    pub config: Config,
}

impl AppState {
    /// Wires the pipeline around a model transport.
    pub fn new(config: Config, transport: Arc<dyn CompletionTransport>) -> Self {
        let client = GenerationClient::new(transport, config.retry_policy());
        let generator = Arc::new(ResumeGenerator::new(client, config.generation_timeout));

        Self {
            batch: BatchOrchestrator::new(Arc::clone(&generator)),
            generator,
            renderer: DocumentRenderer::default(),
            stats: Arc::new(ServiceStats::new()),
            config,
        }
    }
}
