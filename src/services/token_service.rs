// src/services/token_service.rs

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AccessClaims, Principal, RefreshClaims, TokenKind, TokenPair},
};

/// Motivo interno da rejeição. Só serve para log: para fora vira sempre `Unauthenticated`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("token expirado")]
    Expired,
    #[error("assinatura ou formato inválido")]
    BadSignature,
    #[error("tipo de token inesperado")]
    WrongKind,
}

impl From<AuthError> for AppError {
    fn from(_: AuthError) -> Self {
        AppError::Unauthenticated
    }
}

/// Token Issuer/Verifier. Access e refresh usam segredos distintos.
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_minutes: i64,
    refresh_days: i64,
}

impl TokenService {
    pub fn new(
        access_secret: String,
        refresh_secret: String,
        access_minutes: i64,
        refresh_days: i64,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_minutes,
            refresh_days,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_minutes * 60
    }

    /// Emite o par (access, refresh) para o principal.
    pub fn issue(&self, principal: &Principal) -> Result<TokenPair, AppError> {
        let access_token = self.issue_access(principal)?;

        let now = Utc::now();
        let refresh_claims = RefreshClaims {
            sub: principal.id,
            kind: TokenKind::Refresh,
            iat: now.timestamp(),
            exp: (now + Duration::days(self.refresh_days)).timestamp(),
            jti: Uuid::new_v4(),
        };
        let refresh_token = sign(&refresh_claims, &self.refresh_secret)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl_secs(),
            token_type: "Bearer".to_string(),
        })
    }

    pub fn issue_access(&self, principal: &Principal) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: principal.id,
            org: principal.organization_id,
            role: principal.global_role,
            kind: TokenKind::Access,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.access_minutes)).timestamp(),
            jti: Uuid::new_v4(),
        };
        sign(&claims, &self.access_secret)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        verify(token, &self.access_secret, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        verify(token, &self.refresh_secret, TokenKind::Refresh)
    }

    #[cfg(test)]
    pub(crate) fn sign_access(&self, claims: &AccessClaims) -> String {
        sign(claims, &self.access_secret).unwrap()
    }
}

/// Converte o `exp` (unix) em data para o ledger de revogação.
pub fn expiry_of(exp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(exp, 0).single().unwrap_or_else(Utc::now)
}

fn sign<C: Serialize>(claims: &C, secret: &str) -> Result<String, AppError> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

fn verify<C: DeserializeOwned>(token: &str, secret: &str, expected: TokenKind) -> Result<C, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    // Decodifica sem formato fixo: o `kind` é checado antes do formato completo das claims
    let data = decode::<Value>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::BadSignature,
        })?;

    let kind = data
        .claims
        .get("kind")
        .and_then(|k| serde_json::from_value::<TokenKind>(k.clone()).ok());
    if kind != Some(expected) {
        return Err(AuthError::WrongKind);
    }

    serde_json::from_value(data.claims).map_err(|_| AuthError::BadSignature)
}
