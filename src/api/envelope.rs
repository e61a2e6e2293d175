use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::ApiError;
use crate::models::ApiEnvelope;

/// Decode a response body into `T`, honouring the `{ error }` payload.
///
/// The schedule API reports semantic failures in the body, sometimes with a
/// 2xx status, so the body is inspected before the status code.
pub fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    match serde_json::from_str::<ApiEnvelope<T>>(body) {
        Ok(ApiEnvelope::Error { error }) => Err(ApiError::Api {
            error: error.error,
            message: error.message,
        }),
        _ if !status.is_success() => Err(ApiError::Status {
            status: status.as_u16(),
            message: truncate(body, 200),
        }),
        Ok(ApiEnvelope::Items { items }) => Ok(items),
        Err(e) => Err(ApiError::Other(anyhow::anyhow!("Malformed response: {e}"))),
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
