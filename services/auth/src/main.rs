use std::time::Duration;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::{info, warn};

use lumina_auth::config::{AuthConfig, CodeStoreKind};
use lumina_auth::infra::cache::RedisVerificationCodeStore;
use lumina_auth::infra::clock::SystemClock;
use lumina_auth::infra::db::{DbUserRepository, DbVerificationCodeRepository};
use lumina_auth::infra::delivery::ChannelDelivery;
use lumina_auth::infra::mail::SmtpMailer;
use lumina_auth::infra::sms::HttpSmsGateway;
use lumina_auth::infra::store::CodeStore;
use lumina_auth::router::build_router;
use lumina_auth::state::AppState;
use lumina_auth::usecase::sweep::ExpirySweeper;
use lumina_core::config::Config as _;
use lumina_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AuthConfig::from_env().context("load auth config")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let codes = match config.code_store {
        CodeStoreKind::Postgres => CodeStore::Postgres(DbVerificationCodeRepository {
            db: db.clone(),
        }),
        CodeStoreKind::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL is required when CODE_STORE=redis")?;
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .context("create redis pool")?;
            CodeStore::Redis(RedisVerificationCodeStore { pool })
        }
    };

    let mailer = match config.mail() {
        Some(settings) => Some(SmtpMailer::new(&settings).context("configure smtp transport")?),
        None => {
            warn!("MAIL_* not fully configured; email codes will only be logged");
            None
        }
    };
    let sms = match config.sms_gateway() {
        Some((url, token)) => {
            Some(HttpSmsGateway::new(url, token).context("configure sms gateway")?)
        }
        None => {
            warn!("SMS_GATEWAY_URL not set; sms codes will only be logged");
            None
        }
    };

    if config.expose_codes {
        warn!("EXPOSE_CODES is enabled; issued codes are returned to callers");
    }

    if codes.needs_sweeper() {
        let sweeper = ExpirySweeper {
            codes: codes.clone(),
            clock: SystemClock,
            interval: Duration::from_secs(config.code_sweep_interval_secs.max(1)),
        };
        tokio::spawn(sweeper.run());
    } else {
        info!(backend = codes.backend(), "store expires codes natively; sweeper disabled");
    }

    info!(backend = codes.backend(), "verification code store ready");

    let state = AppState {
        users: DbUserRepository { db },
        codes,
        delivery: ChannelDelivery { mailer, sms },
        expose_codes: config.expose_codes,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
