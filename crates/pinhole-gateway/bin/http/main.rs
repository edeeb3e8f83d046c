mod cli;

use crate::cli::{CacheBackendArg, LogFormatArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use pinhole_cache::{MokaUrlCache, NoopUrlCache, RedisUrlCache};
use pinhole_core::{Algorithm, MappingRepository, Shortener};
use pinhole_gateway::{App, AppState};
use pinhole_shortener::{spawn_sweeper, ShortenerConfig, ShortenerService};
use pinhole_storage::{InMemoryRepository, MySqlRepository};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    let algorithm = Algorithm::from_name(&config.algorithm).unwrap_or_else(|| {
        warn!(
            algorithm = %config.algorithm,
            "unknown algorithm, falling back to base62"
        );
        Algorithm::default()
    });

    info!(
        listen_addr = %config.listen_addr,
        algorithm = %algorithm,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting pinhole gateway"
    );

    let shortener_config = ShortenerConfig::builder()
        .cache_ttl(Duration::from_secs(config.cache_ttl_secs))
        .max_generation_attempts(config.max_generation_attempts)
        .build();

    let shortener = match config.storage {
        StorageBackendArg::InMemory => {
            build_shortener(InMemoryRepository::new(), &config, shortener_config).await?
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn).await?;
            repository.ensure_schema().await?;
            build_shortener(repository, &config, shortener_config).await?
        }
    };

    run(config, shortener, algorithm).await
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

async fn build_shortener<R: MappingRepository>(
    repository: R,
    config: &CLI,
    shortener_config: ShortenerConfig,
) -> anyhow::Result<Arc<dyn Shortener>> {
    let shortener: Arc<dyn Shortener> = match config.cache {
        CacheBackendArg::Disabled => Arc::new(ShortenerService::new(
            repository,
            NoopUrlCache,
            shortener_config,
        )),
        CacheBackendArg::Memory => Arc::new(ShortenerService::new(
            repository,
            MokaUrlCache::with_capacity(config.cache_capacity),
            shortener_config,
        )),
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            let cache = RedisUrlCache::connect_or_noop(redis_url).await?;
            Arc::new(ShortenerService::new(repository, cache, shortener_config))
        }
    };

    Ok(shortener)
}

async fn run(config: CLI, shortener: Arc<dyn Shortener>, algorithm: Algorithm) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = spawn_sweeper(
        Arc::clone(&shortener),
        Duration::from_secs(config.sweep_interval_secs),
        shutdown_rx.clone(),
    );

    let mut state = AppState::new(shortener, algorithm);
    if let Some(public_base_url) = config.public_base_url {
        state = state.with_base_url(public_base_url);
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    let mut server_shutdown = shutdown_rx;
    let server = axum::serve(listener, App::router(state))
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown_signal() => {
            let _ = shutdown_tx.send(true);

            let grace = Duration::from_secs(config.shutdown_grace_secs);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    grace_secs = config.shutdown_grace_secs,
                    "in-flight requests did not finish within the grace period"
                ),
            }
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        warn!(error = %e, "expiration sweeper task failed");
    }

    info!("gateway stopped");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
