//! Admin login and logout.

use chrono::{Duration, Utc};
use domain::models::{AdminLoginResponse, AdminUserInfo};
use persistence::repositories::AdminRepository;
use shared::crypto::{generate_session_token, sha256_hex};
use shared::password::verify_password;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::ApiError;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Issues and revokes admin sessions.
#[derive(Clone)]
pub struct AdminAuthService {
    repo: AdminRepository,
    session_ttl: Duration,
}

impl AdminAuthService {
    pub fn new(pool: PgPool, session_ttl_secs: i64) -> Self {
        Self {
            repo: AdminRepository::new(pool),
            session_ttl: Duration::seconds(session_ttl_secs),
        }
    }

    /// Verifies the password and opens a session. The raw token is returned
    /// once and never stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminLoginResponse, ApiError> {
        let Some(admin) = self.repo.find_by_username(username).await? else {
            warn!(username = %username, "Admin login for unknown user");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &admin.password_hash)? {
            warn!(username = %username, "Admin login with wrong password");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = generate_session_token();
        let expires_at = Utc::now() + self.session_ttl;
        self.repo
            .create_session(admin.id, &sha256_hex(&token), expires_at)
            .await?;

        info!(admin_id = admin.id, username = %admin.username, "Admin logged in");

        Ok(AdminLoginResponse {
            token,
            expires_at,
            user: AdminUserInfo {
                id: admin.id,
                username: admin.username,
            },
        })
    }

    /// Revokes the session with the given token hash.
    pub async fn logout(&self, token_hash: &str) -> Result<(), ApiError> {
        if !self.repo.delete_session_by_token(token_hash).await? {
            return Err(ApiError::Unauthorized("Invalid or expired token".to_string()));
        }
        Ok(())
    }
}
