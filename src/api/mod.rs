pub mod handlers;
pub mod routes;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub audio_base64: String,
    pub format: String,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
