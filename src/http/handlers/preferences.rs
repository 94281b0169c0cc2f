//! Per-user preference document.
//!
//! The caller is identified by the `userEmail` cookie set by the sign-in
//! flow. Verifying that identity is someone else's job.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};
use percent_encoding::percent_decode_str;
use serde_json::Value;
use tracing::info;

use super::super::types::{PreferencesResponse, SuccessResponse};
use super::super::validation;
use super::super::{AppError, AppState, metrics};

const USER_COOKIE: &str = "userEmail";

/// GET /api/preferences - Load the caller's preferences.
pub(crate) async fn get_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PreferencesResponse>, AppError> {
    let email = user_email(&headers).ok_or(AppError::Unauthorized)?;
    metrics::record_preferences_operation("get");

    let stored = state
        .kv
        .get(&preferences_key(&email))
        .await
        .map_err(|e| AppError::internal("Internal server error", e))?;

    // Values written outside this service may not be JSON.
    let preferences = stored.map(|bytes| {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    });
    Ok(Json(PreferencesResponse { preferences }))
}

/// POST /api/preferences - Replace the caller's preferences.
pub(crate) async fn save_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let preferences = validation::parse_json(&body)?;
    let email = user_email(&headers).ok_or(AppError::Unauthorized)?;
    metrics::record_preferences_operation("save");

    let key = preferences_key(&email);
    let bytes = serde_json::to_vec(&preferences)
        .map_err(|e| AppError::internal("Internal server error", e))?;
    state
        .kv
        .set(&key, &bytes)
        .await
        .map_err(|e| AppError::internal("Internal server error", e))?;

    info!(key = %key, "Preferences saved");
    Ok(Json(SuccessResponse { success: true }))
}

fn preferences_key(email: &str) -> String {
    format!("user:{email}")
}

/// Value of the identity cookie, if present and non-empty.
///
/// The value is percent-decoded; one that does not decode to UTF-8 is used
/// as sent.
fn user_email(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == USER_COOKIE)
        .map(|(_, value)| decode_cookie_value(value.trim_matches('"')))
        .filter(|value| !value.is_empty())
}

fn decode_cookie_value(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_string(), |decoded| decoded.into_owned())
}
