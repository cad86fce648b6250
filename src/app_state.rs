use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use crate::{catalog::ServiceCatalog, config::AppConfig, llm::LlmManager};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<dyn ServiceCatalog>,
    /// Sólo presente si la generación con IA está habilitada.
    pub llm_manager: Option<LlmManager>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}
