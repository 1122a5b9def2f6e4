use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;

const SIGNING_KEY_ENV: &str = "JWT_SIGNING_KEY";

/// Composition root. Every service gets its collaborators here, once.
pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub post_service: Arc<dyn PostService>,
    pub token_codec: Arc<dyn TokenCodec>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let signing_key = std::env::var(SIGNING_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| settings.auth.signing_key.clone());
        if signing_key.is_empty() {
            return Err(anyhow!(
                "no token signing key: set auth.signing_key or {SIGNING_KEY_ENV}"
            ));
        }
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.auth.issuer.clone(),
            ttl: chrono::Duration::seconds(i64::try_from(settings.auth.token_ttl_secs)?),
            signing_key: signing_key.into_bytes(),
        }));

        let (user_repo, post_repo, pool): (Arc<dyn UserRepo>, Arc<dyn PostRepo>, Option<MySqlPool>) =
            match settings.store.backend.as_str() {
                "fake" => (
                    Arc::new(MemoryUserRepo::new()),
                    Arc::new(MemoryPostRepo::new()),
                    None,
                ),
                "real" => {
                    let pool = MySqlPoolOptions::new()
                        .max_connections(settings.store.max_connections)
                        .connect(&settings.store.dsn)
                        .await?;
                    (
                        Arc::new(MySqlUserRepo::new(pool.clone())),
                        Arc::new(MySqlPostRepo::new(pool.clone())),
                        Some(pool),
                    )
                }
                other => return Err(anyhow!("Unknown store backend: {}", other)),
            };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let aggregator: Arc<dyn UserAggregator> = Arc::new(PostTotalAggregator::new(
            post_repo.clone(),
            settings.aggregation.concurrency,
        ));

        let auth_service: Arc<dyn AuthService> =
            Arc::new(RealAuthService::new(user_repo.clone(), credential_hasher));
        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(
            user_repo,
            post_repo.clone(),
            aggregator,
        ));
        let post_service: Arc<dyn PostService> = Arc::new(RealPostService::new(post_repo));

        info!(
            backend = %settings.store.backend,
            concurrency = settings.aggregation.concurrency,
            "server started"
        );

        Ok(Self {
            auth_service,
            user_service,
            post_service,
            token_codec,
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
