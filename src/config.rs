// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        FeatureRepository, FeatureStore, MembershipRepository, MembershipStore,
        OrganizationRepository, OrganizationStore, PrincipalRepository, PrincipalStore,
        RevocationRepository, RevocationStore, StaffRepository, StaffStore,
    },
    services::{
        auth::AuthService, feature_service::FeatureService,
        membership_service::MembershipService, plan_limits::PlanLimitEvaluator,
        revocation_service::RevocationService, staff_service::StaffService,
        tenancy_service::TenancyService, token_service::TokenService,
    },
};

/// Configuração lida do ambiente (`.env` opcional).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub bind_addr: String,
    pub revocation_sweep_secs: u64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_refresh_secret: required("JWT_REFRESH_SECRET")?,
            access_token_minutes: parse_or("ACCESS_TOKEN_MINUTES", 15)?,
            refresh_token_days: parse_or("REFRESH_TOKEN_DAYS", 7)?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            revocation_sweep_secs: parse_or("REVOCATION_SWEEP_SECS", 3600)?,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret == self.jwt_refresh_secret {
            bail!("JWT_SECRET e JWT_REFRESH_SECRET precisam ser diferentes");
        }
        if self.access_token_minutes <= 0 || self.refresh_token_days <= 0 {
            bail!("Validade dos tokens precisa ser positiva");
        }
        if self.access_token_minutes >= self.refresh_token_days * 24 * 60 {
            bail!("O access token precisa expirar antes do refresh token");
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST fora do intervalo 4..=31");
        }
        if self.revocation_sweep_secs == 0 {
            bail!("REVOCATION_SWEEP_SECS precisa ser maior que zero");
        }
        Ok(())
    }

    pub fn revocation_sweep_every(&self) -> Duration {
        Duration::from_secs(self.revocation_sweep_secs)
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} deve ser definida"))
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: {raw}")),
        Err(_) => Ok(default),
    }
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

/// Handles de armazenamento usados para montar os serviços.
pub struct Stores {
    pub principals: Arc<dyn PrincipalStore>,
    pub revocations: Arc<dyn RevocationStore>,
    pub staff: Arc<dyn StaffStore>,
    pub memberships: Arc<dyn MembershipStore>,
    pub organizations: Arc<dyn OrganizationStore>,
    pub features: Arc<dyn FeatureStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            principals: Arc::new(PrincipalRepository::new(pool.clone())),
            revocations: Arc::new(RevocationRepository::new(pool.clone())),
            staff: Arc::new(StaffRepository::new(pool.clone())),
            memberships: Arc::new(MembershipRepository::new(pool.clone())),
            organizations: Arc::new(OrganizationRepository::new(pool.clone())),
            features: Arc::new(FeatureRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub revocation_service: RevocationService,
    pub membership_service: MembershipService,
    pub tenancy_service: TenancyService,
    pub staff_service: StaffService,
    pub feature_service: FeatureService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let tokens = TokenService::new(
            config.jwt_secret.clone(),
            config.jwt_refresh_secret.clone(),
            config.access_token_minutes,
            config.refresh_token_days,
        );
        let revocation_service = RevocationService::new(stores.revocations);
        let auth_service = AuthService::new(
            stores.principals,
            tokens,
            revocation_service.clone(),
            config.bcrypt_cost,
        );

        let membership_service =
            MembershipService::new(stores.memberships, stores.organizations.clone());
        let limits = PlanLimitEvaluator::new(stores.organizations.clone(), stores.staff.clone());

        let tenancy_service = TenancyService::new(
            stores.organizations.clone(),
            membership_service.clone(),
            limits.clone(),
        );
        let staff_service = StaffService::new(
            stores.staff,
            stores.organizations.clone(),
            membership_service.clone(),
            limits,
            config.bcrypt_cost,
        );
        let feature_service = FeatureService::new(stores.features, stores.organizations);

        Self {
            config: Arc::new(config),
            i18n_store: Arc::new(I18nStore::default()),
            auth_service,
            revocation_service,
            membership_service,
            tenancy_service,
            staff_service,
            feature_service,
        }
    }

    #[cfg(test)]
    pub fn in_memory(store: Arc<crate::db::memory::MemoryStore>) -> Self {
        let stores = Stores {
            principals: store.clone(),
            revocations: store.clone(),
            staff: store.clone(),
            memberships: store.clone(),
            organizations: store.clone(),
            features: store,
        };
        Self::new(test_config(), stores)
    }
}

#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/unused".to_string(),
        database_max_connections: 1,
        jwt_secret: "access-secret-for-tests-minimum-32-chars".to_string(),
        jwt_refresh_secret: "refresh-secret-for-tests-minimum-32-chars".to_string(),
        access_token_minutes: 15,
        refresh_token_days: 7,
        bind_addr: "127.0.0.1:0".to_string(),
        revocation_sweep_secs: 3600,
        bcrypt_cost: 4,
    }
}
