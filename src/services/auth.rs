// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PrincipalStore,
    models::{
        auth::{AccessTokenResponse, Principal, TokenPair},
        revocation::RevocationReason,
    },
    services::{
        revocation_service::RevocationService,
        token_service::{expiry_of, TokenService},
    },
};

/// bcrypt fora do runtime async.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn password_matches(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();

    // Executa a verificação em um thread separado
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    principals: Arc<dyn PrincipalStore>,
    tokens: TokenService,
    revocations: RevocationService,
    bcrypt_cost: u32,
    // Hash comparado quando o e-mail não existe, para o tempo de resposta não denunciar contas
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        tokens: TokenService,
        revocations: RevocationService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            principals,
            tokens,
            revocations,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    /// Principal inexistente, senha errada e conta não ativa respondem igual.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        organization_id: Option<Uuid>,
    ) -> Result<TokenPair, AppError> {
        let Some(principal) = self.principals.find_by_email(email, organization_id).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| hash_password("senha-que-nunca-confere", self.bcrypt_cost))
                .await?;
            password_matches(password, dummy).await?;

            tracing::warn!(email = %email, "Login recusado: e-mail desconhecido");
            return Err(AppError::InvalidCredentials);
        };

        if !password_matches(password, &principal.password_hash).await? {
            tracing::warn!(principal_id = %principal.id, "Login recusado: senha inválida");
            return Err(AppError::InvalidCredentials);
        }

        if !principal.is_active() {
            tracing::warn!(principal_id = %principal.id, status = ?principal.status, "Login recusado: conta inativa");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(principal_id = %principal.id, "Login efetuado");
        self.tokens.issue(&principal)
    }

    /// Emite só um novo access token. O refresh token não é rotacionado.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessTokenResponse, AppError> {
        let claims = self.tokens.verify_refresh(refresh_token).map_err(|e| {
            tracing::debug!(reason = %e, "Refresh token rejeitado");
            AppError::from(e)
        })?;

        if self.revocations.is_revoked(refresh_token).await? {
            tracing::debug!(principal_id = %claims.sub, "Refresh token revogado");
            return Err(AppError::Unauthenticated);
        }

        let principal = self.active_principal(claims.sub).await?;

        Ok(AccessTokenResponse {
            access_token: self.tokens.issue_access(&principal)?,
            expires_in: self.tokens.access_ttl_secs(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Revoga o access token da requisição e, se vier, o refresh token do mesmo principal.
    pub async fn logout(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), AppError> {
        self.revoke_presented(access_token, refresh_token, RevocationReason::Logout).await
    }

    pub async fn change_password(
        &self,
        principal_id: Uuid,
        current_password: &str,
        new_password: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), AppError> {
        let principal = self.active_principal(principal_id).await?;

        if !password_matches(current_password, &principal.password_hash).await? {
            tracing::warn!(principal_id = %principal.id, "Troca de senha recusada: senha atual inválida");
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = hash_password(new_password, self.bcrypt_cost).await?;
        self.principals.update_password_hash(principal.id, &new_hash).await?;

        self.revoke_presented(access_token, refresh_token, RevocationReason::PasswordChange)
            .await
    }

    /// Principal existente e ACTIVE; qualquer outra coisa é "não autenticado".
    pub async fn active_principal(&self, principal_id: Uuid) -> Result<Principal, AppError> {
        match self.principals.find_by_id(principal_id).await? {
            Some(p) if p.is_active() => Ok(p),
            _ => Err(AppError::Unauthenticated),
        }
    }

    async fn revoke_presented(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        reason: RevocationReason,
    ) -> Result<(), AppError> {
        let access = self.tokens.verify_access(access_token)?;
        self.revocations
            .revoke(access_token, access.sub, expiry_of(access.exp), reason)
            .await?;

        if let Some(raw) = refresh_token {
            match self.tokens.verify_refresh(raw) {
                Ok(refresh) if refresh.sub == access.sub => {
                    self.revocations
                        .revoke(raw, refresh.sub, expiry_of(refresh.exp), reason)
                        .await?;
                }
                Ok(_) => {
                    tracing::warn!(principal_id = %access.sub, "Refresh token de outro principal ignorado");
                }
                // Token já inválido não precisa entrar no ledger
                Err(e) => tracing::debug!(reason = %e, "Refresh token inválido ignorado no logout"),
            }
        }

        Ok(())
    }
}
