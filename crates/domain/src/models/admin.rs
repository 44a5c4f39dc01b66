//! Admin console account and session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Username used when a login request omits one.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// An admin console account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A live admin session resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub session_id: i64,
    pub admin_id: i64,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

fn default_username() -> String {
    DEFAULT_ADMIN_USERNAME.to_string()
}

/// Body of `POST /api/v1/admin/auth`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[serde(default = "default_username")]
    #[validate(length(min = 1, max = 64, message = "Invalid username"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl AdminLoginRequest {
    /// Trims the username before validation.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserInfo {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AdminUserInfo,
}
