pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

pub use config::Config;
pub use prompt::PromptService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub prompt_service: Arc<PromptService>,
}
