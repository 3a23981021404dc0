//! API client for the portal backend

use gloo_net::http::{Request, RequestBuilder};
use serde_json::Value;

use crate::session;
use crate::types::*;

const API_BASE: &str = "/api";

// ============================================================================
// Auth
// ============================================================================

pub async fn login(email: &str, password: &str) -> Result<AuthResponse, String> {
    let url = format!("{}/auth/login", API_BASE);
    let body = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    post_json::<LoginRequest, AuthResponse>(&url, &body).await
}

pub async fn register(full_name: &str, email: &str, password: &str) -> Result<AuthResponse, String> {
    let url = format!("{}/auth/register", API_BASE);
    let body = RegisterRequest {
        full_name: full_name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };
    post_json::<RegisterRequest, AuthResponse>(&url, &body).await
}

pub async fn me() -> Result<User, String> {
    let url = format!("{}/auth/me", API_BASE);
    fetch_json::<User>(&url).await
}

// ============================================================================
// Tenancy metadata
// ============================================================================

pub async fn list_divisions() -> Result<Vec<Division>, String> {
    let url = format!("{}/meta/divisions", API_BASE);
    fetch_json::<Vec<Division>>(&url).await
}

pub async fn list_screens() -> Result<Vec<Screen>, String> {
    let url = format!("{}/meta/screens", API_BASE);
    fetch_json::<Vec<Screen>>(&url).await
}

pub async fn my_access() -> Result<Vec<AccessGrant>, String> {
    let url = format!("{}/access/my-access", API_BASE);
    fetch_json::<Vec<AccessGrant>>(&url).await
}

// ============================================================================
// Form definitions
// ============================================================================

/// The active definition for a screen, or `None` when nothing has been
/// published yet.
pub async fn get_active_definition(
    division_id: &str,
    screen_id: &str,
) -> Result<Option<FormDefinition>, String> {
    let url = format!(
        "{}/meta/form-definitions/{}/{}",
        API_BASE,
        encode(division_id),
        encode(screen_id)
    );
    fetch_optional::<FormDefinition>(&url).await
}

/// Publish a new definition version. The backend appends it and atomically
/// marks it active; the previous version is never mutated.
pub async fn save_definition(
    request: &SaveDefinitionRequest,
) -> Result<SaveDefinitionResponse, String> {
    let url = format!("{}/meta/form-definitions", API_BASE);
    post_json::<SaveDefinitionRequest, SaveDefinitionResponse>(&url, request).await
}

// ============================================================================
// Submissions
// ============================================================================

pub async fn get_screen_definition(
    division_id: &str,
    screen_id: &str,
) -> Result<Option<FormDefinition>, String> {
    let url = format!(
        "{}/forms/{}/{}/schema",
        API_BASE,
        encode(division_id),
        encode(screen_id)
    );
    fetch_optional::<FormDefinition>(&url).await
}

pub async fn list_submissions(
    division_id: &str,
    screen_id: &str,
) -> Result<Vec<Submission>, String> {
    let url = format!(
        "{}/forms/{}/{}/submissions",
        API_BASE,
        encode(division_id),
        encode(screen_id)
    );
    fetch_json::<Vec<Submission>>(&url).await
}

/// Submit a value map matching the active schema. Empty-string values have
/// already been pruned by the form layer.
pub async fn submit_values(
    division_id: &str,
    screen_id: &str,
    values: &Value,
) -> Result<(), String> {
    let url = format!(
        "{}/forms/{}/{}/submit",
        API_BASE,
        encode(division_id),
        encode(screen_id)
    );
    post_empty(&url, values).await
}

// ============================================================================
// Helper functions
// ============================================================================

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn with_auth(request: RequestBuilder) -> RequestBuilder {
    match session::token() {
        Some(token) => request.header("Authorization", &format!("Bearer {token}")),
        None => request,
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = with_auth(Request::get(url))
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let api_response: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    if api_response.success {
        api_response
            .data
            .ok_or_else(|| "No data in response".to_string())
    } else {
        Err(api_response
            .error
            .unwrap_or_else(|| "Unknown error".to_string()))
    }
}

/// Like `fetch_json` but a missing/null payload is a valid answer.
async fn fetch_optional<T: serde::de::DeserializeOwned>(url: &str) -> Result<Option<T>, String> {
    let response = with_auth(Request::get(url))
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let api_response: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    if api_response.success {
        Ok(api_response.data)
    } else {
        Err(api_response
            .error
            .unwrap_or_else(|| "Unknown error".to_string()))
    }
}

async fn post_json<T: serde::Serialize, R: serde::de::DeserializeOwned>(
    url: &str,
    body: &T,
) -> Result<R, String> {
    let response = with_auth(Request::post(url))
        .json(body)
        .map_err(|e| format!("Failed to serialize body: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let api_response: ApiResponse<R> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    if api_response.success {
        api_response
            .data
            .ok_or_else(|| "No data in response".to_string())
    } else {
        Err(api_response
            .error
            .unwrap_or_else(|| "Unknown error".to_string()))
    }
}

/// POST request that expects no data in response (just success/error)
async fn post_empty<T: serde::Serialize>(url: &str, body: &T) -> Result<(), String> {
    let response = with_auth(Request::post(url))
        .json(body)
        .map_err(|e| format!("Failed to serialize body: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let api_response: ApiResponse<()> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    if api_response.success {
        Ok(())
    } else {
        Err(api_response
            .error
            .unwrap_or_else(|| "Unknown error".to_string()))
    }
}
