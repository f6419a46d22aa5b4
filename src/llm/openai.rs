use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
};

use url::Url;

use super::{ChatMessage, GenerateRequest, GenerateResponse, Provider, Role};

const DEFAULT_SERVER: &str = "api.openai.com";

pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
    server_address: String,
}

impl OpenAIProvider {
    pub fn new(api_key: &str, base_url: Option<&str>) -> anyhow::Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("OpenAI API key is not set");
        }

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        let mut server_address = DEFAULT_SERVER.to_string();

        if let Some(base) = base_url {
            server_address = host_of(base)?;
            config = config.with_api_base(base.trim_end_matches('/'));
        }

        Ok(Self {
            client: Client::with_config(config),
            server_address,
        })
    }
}

fn host_of(base_url: &str) -> anyhow::Result<String> {
    let url = Url::parse(base_url)
        .map_err(|e| anyhow::anyhow!("invalid OpenAI base URL {base_url}: {e}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("unsupported scheme in OpenAI base URL: {base_url}");
    }

    url.host_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("OpenAI base URL has no host: {base_url}"))
}

fn to_openai_message(message: &ChatMessage) -> ChatCompletionRequestMessage {
    match message.role {
        Role::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(message.content.clone()),
            name: None,
        }),
        Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(message.content.clone()),
            name: None,
        }),
    }
}

#[async_trait::async_trait]
impl Provider for OpenAIProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        #[allow(deprecated)]
        let request = CreateChatCompletionRequest {
            model: req.model.clone(),
            messages: req.messages.iter().map(to_openai_message).collect(),
            temperature: Some(req.temperature),
            max_tokens: Some(req.max_tokens),
            ..Default::default()
        };

        let response = self.client.chat().create(request).await?;

        let first = response.choices.first();
        let content = first.and_then(|c| c.message.content.clone());
        let finish_reason = first
            .and_then(|c| c.finish_reason)
            .map(|r| format!("{r:?}").to_lowercase())
            .unwrap_or_default();

        let (input_tokens, output_tokens) = match &response.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None => (0, 0),
        };

        Ok(GenerateResponse {
            content,
            model: response.model,
            input_tokens,
            output_tokens,
            finish_reason,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn server_address(&self) -> &str {
        &self.server_address
    }
}
