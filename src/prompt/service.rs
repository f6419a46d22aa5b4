use std::path::Path;
use std::sync::Arc;

use opentelemetry::KeyValue;

use super::template::Template;
use super::{PromptError, PromptResult};
use crate::config::Config;
use crate::llm::openai::OpenAIProvider;
use crate::llm::{ChatMessage, GenerateRequest, LlmClient, Provider};
use crate::telemetry::metrics::GENERATIONS_TOTAL;

pub const WORD_PLACEHOLDER: &str = "word";
pub const MAX_TOKENS: u32 = 100;
pub const TEMPERATURE: f32 = 0.7;

/// The system instructions and the per-request user template, validated once
/// at load time.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    system: String,
    user: Template,
}

impl PromptTemplates {
    pub fn load(system_path: &Path, user_path: &Path) -> PromptResult<Self> {
        let system = read_template(system_path)?;
        let user = read_template(user_path)?;
        Self::from_strings(&system, &user)
    }

    /// The system template may not contain placeholders; the user template
    /// must contain `{word}` and nothing else.
    pub fn from_strings(system: &str, user: &str) -> PromptResult<Self> {
        let system = Template::parse(system.trim())
            .and_then(|t| t.require_placeholders(&[]).map(|_| t))
            .and_then(|t| t.render(&[]))
            .map_err(|source| PromptError::Template {
                name: "system",
                source,
            })?;

        let user = Template::parse(user.trim())
            .and_then(|t| t.require_placeholders(&[WORD_PLACEHOLDER]).map(|_| t))
            .map_err(|source| PromptError::Template {
                name: "user",
                source,
            })?;

        Ok(Self { system, user })
    }

    /// System instructions first, then the filled user message, one per line.
    pub fn compose(&self, word: &str) -> PromptResult<String> {
        let user_message = self
            .user
            .render(&[(WORD_PLACEHOLDER, word)])
            .map_err(|source| PromptError::Template {
                name: "user",
                source,
            })?;

        Ok(format!("{}\n{}", self.system, user_message))
    }
}

fn read_template(path: &Path) -> PromptResult<String> {
    std::fs::read_to_string(path).map_err(|source| {
        tracing::error!(
            path = %path.display(),
            error = %source,
            "Failed to load prompt template"
        );
        PromptError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub struct PromptService {
    templates: PromptTemplates,
    llm_client: LlmClient,
    model: String,
}

impl PromptService {
    pub fn new(
        templates: PromptTemplates,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            llm_client: LlmClient::new(provider),
            model: model.into(),
        }
    }

    /// Loads both templates, then configures the OpenAI client. Template
    /// failures are reported before any client is built.
    pub fn from_config(config: &Config) -> PromptResult<Self> {
        let templates =
            PromptTemplates::load(&config.system_prompt_path, &config.user_prompt_path)?;

        let api_key = config.openai_api_key.as_deref().unwrap_or_default();
        let provider = OpenAIProvider::new(api_key, config.openai_base_url.as_deref())
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to initialize OpenAI client");
                PromptError::Initialization(e.to_string())
            })?;

        tracing::info!(model = %config.openai_model, "OpenAI client initialized");

        Ok(Self::new(
            templates,
            Arc::new(provider),
            config.openai_model.clone(),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(
        name = "prompt generate",
        skip(self, word),
        fields(
            gen_ai.request.model = %self.model,
            word.chars = word.chars().count(),
            prompt.chars,
            completion.chars,
        )
    )]
    pub async fn generate(&self, word: &str) -> PromptResult<String> {
        let result = self.generate_inner(word).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(PromptError::InvalidInput(_)) => "rejected",
            Err(_) => "error",
        };
        GENERATIONS_TOTAL.add(1, &[KeyValue::new("outcome", outcome)]);

        result
    }

    async fn generate_inner(&self, word: &str) -> PromptResult<String> {
        if word.is_empty() {
            return Err(PromptError::InvalidInput("word must not be empty".into()));
        }

        let prompt = self.templates.compose(word)?;

        let span = tracing::Span::current();
        span.record("prompt.chars", prompt.chars().count());
        tracing::info!(prompt_chars = prompt.chars().count(), "Prompt composed");
        tracing::debug!(%prompt, "Composed prompt");

        let request = GenerateRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(prompt)],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            operation: "generate".to_string(),
        };

        let response = self.llm_client.generate(&request).await.map_err(|e| {
            tracing::error!(
                provider = %self.llm_client.provider_name(),
                error = %e,
                "Error generating text"
            );
            PromptError::Generation(e.to_string())
        })?;

        let text = response
            .content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                tracing::error!(
                    finish_reason = %response.finish_reason,
                    "Endpoint returned no usable completion"
                );
                PromptError::Generation("response contained no completion text".into())
            })?
            .to_string();

        span.record("completion.chars", text.chars().count());
        tracing::info!(
            completion_chars = text.chars().count(),
            output_tokens = response.output_tokens,
            "Text generated"
        );
        tracing::debug!(completion = %text, "Generated text");

        Ok(text)
    }
}
