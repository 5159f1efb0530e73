use axum::Json;
use chrono::{DateTime, Utc};
use folio_core::AppError;
use serde::Serialize;
use ts_rs::TS;

/// Response envelope shared by every route: `{ ok, message?, data? }`.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/api-envelope.ts"
)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub data: Option<T>,
}

/// JSON body wrapped in the envelope.
pub type ApiJson<T> = Json<ApiEnvelope<T>>;

impl<T> ApiEnvelope<T> {
    /// Successful response carrying data.
    pub fn data(data: T) -> ApiJson<T> {
        Json(Self {
            ok: true,
            message: None,
            data: Some(data),
        })
    }

    /// Successful response carrying data and a message.
    pub fn data_with_message(data: T, message: impl Into<String>) -> ApiJson<T> {
        Json(Self {
            ok: true,
            message: Some(message.into()),
            data: Some(data),
        })
    }
}

impl ApiEnvelope<()> {
    /// Successful response carrying only a message.
    pub fn message(message: impl Into<String>) -> ApiJson<()> {
        Json(Self {
            ok: true,
            message: Some(message.into()),
            data: None,
        })
    }
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub postgres: &'static str,
}

/// Parses an RFC 3339 timestamp supplied by a client.
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| AppError::Validation(format!("invalid {field} '{value}': {error}")))
}
