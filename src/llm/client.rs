use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::Instrument;

use super::{GenerateRequest, GenerateResponse, Provider};
use crate::telemetry::metrics::{GEN_AI_ERROR_COUNT, GEN_AI_OPERATION_DURATION, GEN_AI_TOKEN_USAGE};

/// Issues one chat call per request against a single provider, wrapped in a
/// `gen_ai.chat` span. Failures are returned as-is; nothing is retried.
pub struct LlmClient {
    provider: Arc<dyn Provider>,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let provider_name = self.provider.name();
        let span_display_name = format!("gen_ai.chat {}", req.model);
        let start = Instant::now();

        let span = tracing::info_span!(
            "gen_ai.chat",
            otel.name = %span_display_name,
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = %provider_name,
            gen_ai.request.model = %req.model,
            server.address = %self.provider.server_address(),
            gen_ai.request.temperature = req.temperature,
            gen_ai.request.max_tokens = req.max_tokens as i64,
            gen_ai.request.message_count = req.messages.len() as i64,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            app.operation = %req.operation,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );

        let result = self.provider.generate(req).instrument(span.clone()).await;

        let duration = start.elapsed().as_secs_f64();

        match result {
            Ok(resp) => {
                span.record("gen_ai.response.model", resp.model.as_str());
                span.record("gen_ai.usage.input_tokens", resp.input_tokens as i64);
                span.record("gen_ai.usage.output_tokens", resp.output_tokens as i64);
                if !resp.finish_reason.is_empty() {
                    span.record(
                        "gen_ai.response.finish_reasons",
                        resp.finish_reason.as_str(),
                    );
                }

                let op_kv = KeyValue::new("gen_ai.operation.name", "chat");
                let provider_kv = KeyValue::new("gen_ai.provider.name", provider_name.to_string());
                let model_kv = KeyValue::new("gen_ai.request.model", req.model.clone());

                GEN_AI_TOKEN_USAGE.record(
                    f64::from(resp.input_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "input"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_TOKEN_USAGE.record(
                    f64::from(resp.output_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "output"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_OPERATION_DURATION.record(duration, &[op_kv, provider_kv, model_kv]);

                Ok(resp)
            }
            Err(err) => {
                let error_type = classify_error(&err);
                span.record("otel.status_code", "ERROR");
                span.record("error.type", error_type);

                GEN_AI_ERROR_COUNT.add(
                    1,
                    &[
                        KeyValue::new("gen_ai.provider.name", provider_name.to_string()),
                        KeyValue::new("gen_ai.request.model", req.model.clone()),
                        KeyValue::new("error.type", error_type),
                    ],
                );

                Err(err)
            }
        }
    }
}

pub(crate) fn classify_error(err: &anyhow::Error) -> &'static str {
    let msg = err.to_string().to_lowercase();
    if msg.contains("rate limit") || msg.contains("429") {
        "rate_limit"
    } else if msg.contains("timeout") || msg.contains("timed out") || msg.contains("deadline") {
        "timeout"
    } else if msg.contains("401")
        || msg.contains("403")
        || msg.contains("auth")
        || msg.contains("api key")
    {
        "auth_error"
    } else if msg.contains("400") || msg.contains("422") || msg.contains("invalid") {
        "invalid_request"
    } else if msg.contains("500")
        || msg.contains("502")
        || msg.contains("503")
        || msg.contains("server")
    {
        "server_error"
    } else if msg.contains("connect")
        || msg.contains("dns")
        || msg.contains("network")
        || msg.contains("reset")
    {
        "network_error"
    } else if msg.contains("json") || msg.contains("deserializ") || msg.contains("decode") {
        "malformed_response"
    } else {
        "unknown_error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Provider for CountingProvider {
        async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("503 service unavailable");
            }
            Ok(GenerateResponse {
                content: Some(format!("echo: {}", req.messages[0].content)),
                model: req.model.clone(),
                input_tokens: 3,
                output_tokens: 2,
                finish_reason: "stop".to_string(),
            })
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn server_address(&self) -> &str {
            "localhost"
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage::system("hi")],
            temperature: 0.7,
            max_tokens: 100,
            operation: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_passes_response_through() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let client = LlmClient::new(provider.clone());

        let resp = client.generate(&request()).await.unwrap();

        assert_eq!(resp.content.as_deref(), Some("echo: hi"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.provider_name(), "counting");
    }

    #[tokio::test]
    async fn test_generate_does_not_retry() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let client = LlmClient::new(provider.clone());

        let err = client.generate(&request()).await.unwrap_err();

        assert!(err.to_string().contains("503"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_classify_error_categories() {
        let cases = vec![
            ("rate limit exceeded", "rate_limit"),
            ("status 429: too many requests", "rate_limit"),
            ("request timed out", "timeout"),
            ("401 unauthorized", "auth_error"),
            ("Incorrect API key provided", "auth_error"),
            ("400 bad request", "invalid_request"),
            ("invalid model name", "invalid_request"),
            ("502 bad gateway", "server_error"),
            ("connection refused", "network_error"),
            ("dns resolution failed", "network_error"),
            ("failed to deserialize api response", "malformed_response"),
            ("something unexpected", "unknown_error"),
        ];

        for (msg, expected) in cases {
            let err = anyhow::anyhow!("{}", msg);
            assert_eq!(
                classify_error(&err),
                expected,
                "classify_error({msg:?}) should be {expected:?}"
            );
        }
    }
}
