use crate::{
    error::{AppError, AppResult},
    state::AppState,
};
use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of `POST /api/voice-command`.
///
/// `query` is kept as a raw JSON value so a number or object is rejected by
/// the handler with the normal apology instead of a deserializer error.
#[derive(Debug, Deserialize)]
pub struct VoiceCommandRequest {
    #[serde(default)]
    pub query: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VoiceCommandResponse {
    pub reply: String,
}

impl VoiceCommandRequest {
    /// The trimmed query, or `None` when it is missing, not a string, or blank.
    pub fn normalized_query(&self) -> Option<&str> {
        match &self.query {
            Some(serde_json::Value::String(query)) => {
                let trimmed = query.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }
}

pub async fn voice_command(
    state: web::Data<AppState>,
    body: web::Json<VoiceCommandRequest>,
) -> AppResult<HttpResponse> {
    let query = body
        .normalized_query()
        .ok_or_else(|| AppError::InvalidQuery("query missing, not a string, or blank".to_string()))?;

    let (kind, reply) = state.responder().respond(query);
    debug!(reply_kind = kind.as_str(), query_len = query.len(), "Answered voice command");

    Ok(HttpResponse::Ok().json(VoiceCommandResponse { reply }))
}

/// Unreadable bodies (bad JSON, wrong content type) get the same apology as a missing query.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidQuery(err.to_string()).into()
}
