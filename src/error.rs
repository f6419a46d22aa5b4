use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::prompt::PromptError;

pub const TEMPLATE_LOAD_DETAIL: &str = "Failed to load prompt template";
pub const INITIALIZATION_DETAIL: &str = "Failed to initialize OpenAI";
pub const GENERATION_DETAIL: &str = "Failed to generate text";

/// Errors surfaced at the HTTP boundary. Everything except `Validation` is
/// reported with a fixed detail message; the underlying cause is only logged.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Template error: {0}")]
    TemplateLoad(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Generation error: {0}")]
    Generation(String),
}

impl From<PromptError> for AppError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::InvalidInput(msg) => AppError::Validation(msg),
            PromptError::Initialization(msg) => AppError::Initialization(msg),
            PromptError::Generation(msg) => AppError::Generation(msg),
            e @ (PromptError::TemplateLoad { .. } | PromptError::Template { .. }) => {
                AppError::TemplateLoad(e.to_string())
            }
        }
    }
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::TemplateLoad(msg) => {
                tracing::error!(error = %msg, "Template error");
                TEMPLATE_LOAD_DETAIL.to_string()
            }
            AppError::Initialization(msg) => {
                tracing::error!(error = %msg, "Initialization error");
                INITIALIZATION_DETAIL.to_string()
            }
            AppError::Generation(msg) => {
                tracing::error!(error = %msg, "Generation error");
                GENERATION_DETAIL.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        let body = if let Some(trace_id) = get_trace_id() {
            json!({
                "detail": detail,
                "status": status.as_u16(),
                "trace_id": trace_id,
            })
        } else {
            json!({
                "detail": detail,
                "status": status.as_u16(),
            })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::TemplateError;
    use std::path::PathBuf;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_from_prompt_error() {
        let cases = vec![
            (
                PromptError::InvalidInput("word must not be empty".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PromptError::Initialization("no key".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PromptError::Generation("503".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PromptError::TemplateLoad {
                    path: PathBuf::from("user_prompt.txt"),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                PromptError::Template {
                    name: "user",
                    source: TemplateError::MissingPlaceholder("word".to_string()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_generation_detail_is_fixed() {
        let (status, body) = body_json(AppError::Generation(
            "401 Incorrect API key provided: sk-abc".to_string(),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], GENERATION_DETAIL);
        assert_eq!(body["status"], 500);
        assert!(!body.to_string().contains("sk-abc"));
    }

    #[tokio::test]
    async fn test_template_and_initialization_details() {
        let (_, body) = body_json(AppError::TemplateLoad("missing file".to_string())).await;
        assert_eq!(body["detail"], TEMPLATE_LOAD_DETAIL);

        let (_, body) = body_json(AppError::Initialization("no key".to_string())).await;
        assert_eq!(body["detail"], INITIALIZATION_DETAIL);
    }

    #[tokio::test]
    async fn test_validation_detail_is_passed_through() {
        let (status, body) =
            body_json(AppError::Validation("word must not be empty".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "word must not be empty");
        assert!(body.get("trace_id").is_none());
    }

    #[test]
    fn test_error_display() {
        let error = AppError::Generation("provider timeout".to_string());
        assert_eq!(error.to_string(), "Generation error: provider timeout");
    }
}
