use crate::api::v1::CookiePolicy;
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub pipeline: AuthPipeline,
    pub cookies: Arc<CookiePolicy>,
    pub lifetimes: Arc<TokenLifetimes>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        if settings.jwt.secret_key.is_empty() {
            return Err(anyhow!("jwt.secret_key must not be empty"));
        }

        let needs_mysql =
            settings.accounts.backend == "mysql" || settings.sessions.backend == "mysql";
        let pool = if needs_mysql {
            let dsn = settings
                .mysql
                .as_ref()
                .ok_or_else(|| anyhow!("mysql backend selected but [mysql] is missing"))?;
            Some(Pool::<MySql>::connect(&dsn.dsn).await?)
        } else {
            None
        };

        let account_repo: Arc<dyn AccountRepo> = match (settings.accounts.backend.as_str(), &pool) {
            ("memory", _) => Arc::new(MemoryAccountRepo::new()),
            ("mysql", Some(pool)) => Arc::new(MySqlAccountRepo::new(pool.clone())),
            (other, _) => return Err(anyhow!("Unknown accounts backend: {}", other)),
        };

        let raw_store: Arc<dyn SessionStore> = match (settings.sessions.backend.as_str(), &pool) {
            ("memory", _) => Arc::new(MemorySessionStore::new()),
            ("mysql", Some(pool)) => Arc::new(MySqlSessionStore::new(pool.clone())),
            ("redis", _) => {
                let dsn = settings
                    .redis
                    .as_ref()
                    .ok_or_else(|| anyhow!("redis backend selected but [redis] is missing"))?;
                let redis_client = redis::Client::open(dsn.dsn.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisSessionStore::new(
                    redis_manager,
                    settings.sessions.key_prefix.clone(),
                ))
            }
            (other, _) => return Err(anyhow!("Unknown sessions backend: {}", other)),
        };
        let session_store: Arc<dyn SessionStore> = Arc::new(DeadlineSessionStore::new(
            raw_store,
            settings.sessions.timeout(),
        ));

        let codec: Arc<dyn ClaimsCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.jwt.issuer.clone(),
            signing_key: settings.jwt.secret_key.clone().into_bytes(),
        }));
        let lifetimes = Arc::new(TokenLifetimes::new(
            settings.jwt.access_ttl(),
            settings.jwt.refresh_ttl(),
        )?);
        let issuer = Arc::new(TokenIssuer::new(codec.clone(), lifetimes.clone()));
        let validator = Arc::new(SessionValidator::new(codec, session_store.clone()));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            account_repo,
            Arc::new(Argon2PasswordHasher),
            issuer,
            validator.clone(),
            session_store,
        ));

        info!(
            accounts = %settings.accounts.backend,
            sessions = %settings.sessions.backend,
            "server started"
        );

        Ok(Self {
            auth_service,
            pipeline: AuthPipeline::new(validator),
            cookies: Arc::new(CookiePolicy::try_from(&settings.cookie)?),
            lifetimes,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
