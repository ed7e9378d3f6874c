// src/models/revocation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "revocation_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevocationReason {
    Logout,
    PasswordChange,
    Forced,
}

// Guardamos apenas o hash do token, nunca o token cru
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RevokedToken {
    pub token_hash: String,
    pub principal_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub reason: RevocationReason,
    pub revoked_at: DateTime<Utc>,
}
