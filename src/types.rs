//! Shared types for the portal API

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard API envelope every endpoint responds with.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl User {
    pub fn is_superadmin(&self) -> bool {
        self.role == "superadmin"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

// ============================================================================
// Tenancy metadata
// ============================================================================

/// Organizational unit owning a set of screens. Opaque to the form core
/// beyond being a lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub code: String,
}

/// One data-collection form slot within a division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A division the current user may submit to, with its visible screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    pub division: Division,
    #[serde(default)]
    pub screens: Vec<Screen>,
}

// ============================================================================
// Form definitions
// ============================================================================

/// A persisted, versioned `(schema, uiSchema)` pair. Versions are
/// append-only; exactly one is active per (division, screen) at a time.
/// The documents stay raw `Value`s on the wire so a malformed stored schema
/// degrades in the interpreter instead of failing the whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub version: u32,
    pub schema: Value,
    #[serde(default)]
    pub ui_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDefinitionRequest {
    pub division_id: String,
    pub screen_id: String,
    pub schema: Value,
    pub ui_schema: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveDefinitionResponse {
    pub version: u32,
}

// ============================================================================
// Submissions
// ============================================================================

/// One stored form submission. `data` preserves field order for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub data: IndexMap<String, Value>,
    pub form_version: u32,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
}
