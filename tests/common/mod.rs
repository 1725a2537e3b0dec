#![allow(dead_code)]

use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use payrouter::application::engine::PaymentEngine;
use payrouter::application::pool::WorkerPool;
use payrouter::application::retry::RetryForever;
use payrouter::application::router::PaymentRouter;
use payrouter::application::summary::SummaryService;
use payrouter::domain::breaker::BreakerConfig;
use payrouter::domain::payment::{Amount, PaymentEnvelope, PaymentRecord, PaymentRequest, Target};
use payrouter::domain::ports::{Ledger, PaymentProcessor, PaymentProcessorBox};
use payrouter::error::{Result, RouterError};
use payrouter::infrastructure::http::{HttpPeer, HttpProcessor};
use payrouter::infrastructure::in_memory::InMemoryLedger;
use payrouter::interfaces::http::{AppState, router};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;

/// In-process processor that fails its first `failures` calls.
#[derive(Default)]
pub struct ScriptedProcessor {
    failures: usize,
    calls: AtomicUsize,
}

impl ScriptedProcessor {
    pub fn failing_first(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::failing_first(0)
    }

    pub fn down() -> Arc<Self> {
        Self::failing_first(usize::MAX)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProcessor for ScriptedProcessor {
    async fn deliver(&self, _envelope: &PaymentEnvelope) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(RouterError::Rejected { status: 500 })
        } else {
            Ok(())
        }
    }
}

pub fn fast_breakers() -> BreakerConfig {
    BreakerConfig {
        max_failures: 3,
        open_duration: Duration::from_millis(50),
    }
}

pub fn engine(
    default: PaymentProcessorBox,
    fallback: PaymentProcessorBox,
    breakers: BreakerConfig,
    workers: usize,
    capacity: usize,
    ledger: Arc<InMemoryLedger>,
) -> PaymentEngine {
    let router = PaymentRouter::new(
        default,
        fallback,
        breakers,
        Box::new(RetryForever {
            floor: Duration::from_millis(5),
        }),
    );
    PaymentEngine::new(WorkerPool::new(workers, capacity), router, ledger)
}

pub fn request(correlation_id: &str, amount: Decimal) -> PaymentRequest {
    PaymentRequest {
        correlation_id: correlation_id.to_string(),
        amount: Amount::new(amount).unwrap(),
    }
}

pub async fn seed(ledger: &InMemoryLedger, target: Target, amount: Decimal, timestamp: DateTime<Utc>) {
    ledger
        .append(PaymentRecord {
            timestamp,
            amount: Amount::new(amount).unwrap(),
            target,
        })
        .await
        .unwrap();
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Clone, Default)]
pub struct ProcessorServer {
    pub failures: usize,
    pub calls: Arc<AtomicUsize>,
    pub bodies: Arc<std::sync::Mutex<Vec<serde_json::Value>>>,
}

async fn processor_payments(
    State(server): State<ProcessorServer>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    server.bodies.lock().unwrap().push(body);
    let call = server.calls.fetch_add(1, Ordering::SeqCst);
    if call < server.failures {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

/// Starts a fake payment processor failing its first `failures` calls.
pub async fn spawn_processor(failures: usize) -> (String, ProcessorServer) {
    let server = ProcessorServer {
        failures,
        ..Default::default()
    };
    let app = Router::new()
        .route("/payments", post(processor_payments))
        .with_state(server.clone());
    (serve(app).await, server)
}

/// Starts a peer whose summary endpoint never answers in time.
pub async fn spawn_slow_peer(delay: Duration) -> String {
    let app = Router::new().route(
        "/payments-summary",
        get(move || async move {
            tokio::time::sleep(delay).await;
            Json(serde_json::json!({
                "default": {"totalRequests": 100, "totalAmount": 100.0},
                "fallback": {"totalRequests": 100, "totalAmount": 100.0}
            }))
        }),
    );
    serve(app).await
}

pub struct Replica {
    pub base_url: String,
    pub ledger: Arc<InMemoryLedger>,
    pub engine: Arc<PaymentEngine>,
}

/// Starts a full replica over HTTP. `peer_url` makes it a master.
pub async fn spawn_replica(
    default_url: &str,
    fallback_url: &str,
    breakers: BreakerConfig,
    peer_url: Option<&str>,
) -> Replica {
    let client = reqwest::Client::new();
    let timeout = Duration::from_millis(500);
    let ledger = Arc::new(InMemoryLedger::new());
    let engine = Arc::new(engine(
        Box::new(HttpProcessor::new(default_url, timeout, client.clone())),
        Box::new(HttpProcessor::new(fallback_url, timeout, client.clone())),
        breakers,
        4,
        100,
        ledger.clone(),
    ));

    let summaries = match peer_url {
        Some(peer) => SummaryService::with_peer(
            ledger.clone(),
            Box::new(HttpPeer::new(peer, client)),
            Duration::from_millis(200),
        ),
        None => SummaryService::local(ledger.clone()),
    };
    let state = AppState {
        engine: engine.clone(),
        summaries: Arc::new(summaries),
    };

    Replica {
        base_url: serve(router(state)).await,
        ledger,
        engine,
    }
}

/// Polls `check` until it returns true or `limit` elapses.
pub async fn eventually<F, Fut>(limit: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
