use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use super::{HealthResponse, SynthesizeResponse};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::tts::SynthesisRequest;

fn validate(request: &SynthesisRequest) -> Result<(), AppError> {
    if request.text.is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty".into()));
    }

    // The format becomes part of the output file name
    if request.output_format.is_empty()
        || !request
            .output_format
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(AppError::BadRequest(format!(
            "Invalid output format '{}'",
            request.output_format
        )));
    }

    Ok(())
}

pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SynthesisRequest>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    validate(&request)?;

    let format = request.output_format.clone();
    let synthesizer = Arc::clone(&state.synthesizer);

    // The external process blocks until it exits
    let audio = tokio::task::spawn_blocking(move || synthesizer.synthesize(&request))
        .await
        .map_err(|e| AppError::Internal(format!("Synthesis task failed: {}", e)))??;

    Ok(Json(SynthesizeResponse {
        audio_base64: STANDARD.encode(&audio),
        format,
        bytes: audio.len(),
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
