//! Event Vibe HTTP server.

use anyhow::Context;
use event_vibe_auth::providers::{ConsoleEmailProvider, SmtpEmailProvider};
use event_vibe_auth::stores::{RedisRateLimiter, RedisSessionStore};
use event_vibe_web::config::{Config, StorageBackend};
use event_vibe_web::{build_router, AnyEmailProvider, AnyRateLimiter, AnySessionStore, AppState, Backend, InMemoryBackend};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_vibe=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Event Vibe server");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        backend = ?config.storage.backend,
        redis = config.redis_url.is_some(),
        smtp = config.smtp.is_some(),
        "Configuration loaded"
    );

    if let Some(addr) = config.server.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to start Prometheus exporter")?;
        info!(address = %addr, "Prometheus exporter listening");
    }

    let email = match &config.smtp {
        Some(smtp) => AnyEmailProvider::Smtp(SmtpEmailProvider::new(
            &smtp.host,
            smtp.port,
            smtp.username.clone(),
            smtp.password.clone(),
            &smtp.from,
        )?),
        None => {
            warn!("SMTP is not configured; verification links are logged");
            AnyEmailProvider::Console(ConsoleEmailProvider::new())
        }
    };

    let redis = match &config.redis_url {
        Some(url) => {
            info!("Connecting to Redis...");
            let sessions = RedisSessionStore::new(url).await?;
            let limiter = RedisRateLimiter::new(url).await?;
            Some((AnySessionStore::Redis(sessions), AnyRateLimiter::Redis(limiter)))
        }
        None => None,
    };

    let recommender = config.anthropic.recommender();
    let auth_config = config.auth.auth_config();

    match config.storage.backend {
        StorageBackend::Memory => {
            let mut state = AppState::<InMemoryBackend>::in_memory_system_clock(email, auth_config, recommender);
            if let Some((sessions, limiter)) = redis {
                state = state.with_sessions(sessions).with_rate_limiter(limiter);
            }
            serve(state, &config).await
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres => {
            let state = postgres_state(&config, email, redis, auth_config, recommender).await?;
            serve(state, &config).await
        }
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("STORAGE_BACKEND=postgres needs a build with the `postgres` feature")
        }
    }
}

#[cfg(feature = "postgres")]
async fn postgres_state(
    config: &Config,
    email: AnyEmailProvider,
    redis: Option<(AnySessionStore, AnyRateLimiter)>,
    auth_config: event_vibe_auth::AuthConfig,
    recommender: event_vibe_recommend::Recommender<event_vibe_recommend::ClaudeRecommendationModel>,
) -> anyhow::Result<AppState<event_vibe_web::PostgresBackend>> {
    use event_vibe_auth::memory::{InMemoryRateLimiter, InMemorySessionStore};
    use event_vibe_auth::stores::postgres::{PostgresIdentityProvider, PostgresProfileRepository};
    use event_vibe_core::environment::SystemClock;
    use event_vibe_events::postgres::{PostgresEventRepository, PostgresRegistrationRepository};
    use event_vibe_web::state::{Readiness, DEFAULT_FLOW_TIMEOUT};
    use std::sync::Arc;

    let url = config
        .storage
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;
    info!("Connecting to PostgreSQL...");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.storage.max_connections)
        .connect(url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    event_vibe_auth::stores::postgres::migrate(&pool).await?;
    event_vibe_events::postgres::migrate(&pool).await?;
    info!("Migrations applied");

    let (sessions, rate_limiter) = redis.unwrap_or_else(|| {
        (
            AnySessionStore::Memory(InMemorySessionStore::new()),
            AnyRateLimiter::Memory(InMemoryRateLimiter::new()),
        )
    });

    let clock: Arc<dyn event_vibe_core::environment::Clock> = Arc::new(SystemClock);
    Ok(AppState {
        identity: PostgresIdentityProvider::new(pool.clone())
            .with_clock(Arc::clone(&clock))
            .with_code_ttl(auth_config.verification_code_ttl),
        profiles: PostgresProfileRepository::new(pool.clone()),
        email,
        sessions,
        rate_limiter,
        events: PostgresEventRepository::new(pool.clone()),
        registrations: PostgresRegistrationRepository::new(pool.clone()),
        clock,
        auth_config,
        recommender,
        flow_timeout: DEFAULT_FLOW_TIMEOUT,
        readiness: Readiness::Postgres(pool),
    })
}

async fn serve<B: Backend>(state: AppState<B>, config: &Config) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = config.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, backend = B::NAME, "Server listening");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = stop_tx.send(());

    let grace = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(seconds = grace.as_secs(), "Shutdown timeout elapsed; dropping open connections"),
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM signal, shutting down gracefully..."),
    }
}
