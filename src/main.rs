use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use portage_exporter::config::{Args, Config};
use portage_exporter::metrics::MetricRegistry;
use portage_exporter::runtime::RealRuntime;
use portage_exporter::server;
use portage_exporter::vdb::Scheduler;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = Config::from_args(&args);
    info!("Starting with {:?}", config);

    let registry = Arc::new(MetricRegistry::new()?);
    let cancel = CancellationToken::new();

    let scheduler = Scheduler::new(
        Arc::new(RealRuntime),
        config.vdb_path.clone(),
        config.interval,
        Arc::clone(&registry),
    );
    let collector = scheduler.spawn(cancel.clone());

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    info!("Serving metrics on http://{}{}", config.listen, config.metrics_path);

    tokio::spawn(cancel_on_signal(cancel.clone()));

    let app = server::router(registry, &config.metrics_path);
    let served = server::serve(listener, app, cancel.clone()).await;

    cancel.cancel();
    collector.await.context("Package scan task failed")?;
    served
}

/// Cancel `token` on Ctrl-C, or SIGTERM on Unix.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutting down");
    token.cancel();
}
