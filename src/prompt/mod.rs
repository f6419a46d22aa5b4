pub mod service;
pub mod template;

use std::path::PathBuf;

use thiserror::Error;

pub use service::{PromptService, PromptTemplates};
pub use template::{Template, TemplateError};

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("failed to initialize LLM client: {0}")]
    Initialization(String),

    #[error("failed to load template from {}: {source}", .path.display())]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {name} template: {source}")]
    Template {
        name: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("failed to generate text: {0}")]
    Generation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type PromptResult<T> = Result<T, PromptError>;
