use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payrouter::application::engine::PaymentEngine;
use payrouter::application::pool::WorkerPool;
use payrouter::application::router::PaymentRouter;
use payrouter::application::summary::SummaryService;
use payrouter::config::{Config, Role};
use payrouter::domain::ports::LedgerHandle;
use payrouter::infrastructure::http::{HttpPeer, HttpProcessor};
use payrouter::infrastructure::in_memory::InMemoryLedger;
use payrouter::interfaces::http::{AppState, router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let client = reqwest::Client::builder().build().into_diagnostic()?;
    let ledger: LedgerHandle = Arc::new(InMemoryLedger::new());

    let payment_router = PaymentRouter::new(
        Box::new(HttpProcessor::new(
            &config.default_processor_url,
            config.delivery_timeout(),
            client.clone(),
        )),
        Box::new(HttpProcessor::new(
            &config.fallback_processor_url,
            config.delivery_timeout(),
            client.clone(),
        )),
        config.breakers(),
        config.retry_policy(),
    );
    let pool = WorkerPool::new(config.workers as usize, config.queue_capacity as usize);
    let engine = Arc::new(PaymentEngine::new(pool, payment_router, ledger.clone()));

    let summaries = match config.role {
        Role::Master => SummaryService::with_peer(
            ledger,
            Box::new(HttpPeer::new(&config.peer_url, client)),
            config.peer_timeout(),
        ),
        Role::Slave => SummaryService::local(ledger),
    };

    let state = AppState {
        engine: engine.clone(),
        summaries: Arc::new(summaries),
    };

    let listener = TcpListener::bind(&config.bind_addr).await.into_diagnostic()?;
    tracing::info!(role = %config.role, workers = config.workers, "listening on {}", config.bind_addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    engine.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
