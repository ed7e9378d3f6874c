// src/services/revocation_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RevocationStore,
    models::revocation::{RevocationReason, RevokedToken},
};

/// SHA-256 (hex) do token cru. É a chave do ledger; o token em si nunca é gravado.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[derive(Clone)]
pub struct RevocationService {
    store: Arc<dyn RevocationStore>,
}

impl RevocationService {
    pub fn new(store: Arc<dyn RevocationStore>) -> Self {
        Self { store }
    }

    pub async fn revoke(
        &self,
        token: &str,
        principal_id: Uuid,
        expires_at: DateTime<Utc>,
        reason: RevocationReason,
    ) -> Result<(), AppError> {
        let record = RevokedToken {
            token_hash: hash_token(token),
            principal_id,
            expires_at,
            reason,
            revoked_at: Utc::now(),
        };
        self.store.insert(&record).await?;

        tracing::info!(principal_id = %principal_id, reason = ?reason, "Token revogado");
        Ok(())
    }

    /// Consultado em toda requisição autenticada, depois da assinatura. Nunca no lugar dela.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        self.store.exists(&hash_token(token)).await
    }

    /// Higiene de armazenamento: um token expirado já cai na verificação de assinatura.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.store.purge_expired(Utc::now()).await
    }
}
