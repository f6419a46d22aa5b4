use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub word: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratedText {
    pub word: String,
    pub text: String,
}

pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> AppResult<Json<GeneratedText>> {
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let text = state.prompt_service.generate(&body.word).await?;

    Ok(Json(GeneratedText {
        word: body.word,
        text,
    }))
}
