use crate::application::retry::{BoundedRetry, RetryForever, RetryPolicyBox};
use crate::domain::breaker::BreakerConfig;
use clap::{Parser, ValueEnum};
use std::fmt;
use std::time::Duration;

/// Replica role, fixed for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    /// Merges the peer replica's summary into its own.
    Master,
    /// Answers with local data only.
    Slave,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Master => f.write_str("master"),
            Role::Slave => f.write_str("slave"),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Routes payments to a default or fallback processor", long_about = None)]
pub struct Config {
    /// Address the HTTP listener binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:9999")]
    pub bind_addr: String,

    /// Replica role
    #[arg(long, env = "ROLE", value_enum, default_value_t = Role::Slave)]
    pub role: Role,

    /// Base URL of the peer replica, queried by the master for summaries
    #[arg(long, env = "PEER_URL", default_value = "http://api2:9999")]
    pub peer_url: String,

    /// Base URL of the preferred payment processor
    #[arg(long, env = "PROCESSOR_DEFAULT_URL", default_value = "http://payment-processor-default:8080")]
    pub default_processor_url: String,

    /// Base URL of the fallback payment processor
    #[arg(long, env = "PROCESSOR_FALLBACK_URL", default_value = "http://payment-processor-fallback:8080")]
    pub fallback_processor_url: String,

    /// Number of routing workers
    #[arg(long, env = "WORKERS", default_value_t = 16, value_parser = clap::value_parser!(u32).range(1..))]
    pub workers: u32,

    /// Pending payments held before new ones are dropped
    #[arg(long, env = "POOLSIZE", default_value_t = 10_000, value_parser = clap::value_parser!(u32).range(1..))]
    pub queue_capacity: u32,

    /// Consecutive failures that open a processor's circuit
    #[arg(long, env = "BREAKER_MAX_FAILURES", default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub breaker_max_failures: u32,

    /// How long an open circuit keeps its processor out of rotation
    #[arg(long, env = "BREAKER_OPEN_MS", default_value_t = 500)]
    pub breaker_open_ms: u64,

    /// Backoff between routing rounds when no circuit is open
    #[arg(long, env = "RETRY_FLOOR_MS", default_value_t = 10)]
    pub retry_floor_ms: u64,

    /// Abandon a payment after this many failed rounds (retries forever if unset)
    #[arg(long, env = "MAX_ROUNDS", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_rounds: Option<u32>,

    /// Timeout of a single delivery attempt
    #[arg(long, env = "DELIVERY_TIMEOUT_MS", default_value_t = 1_000)]
    pub delivery_timeout_ms: u64,

    /// Timeout of the peer summary call
    #[arg(long, env = "PEER_TIMEOUT_MS", default_value_t = 500)]
    pub peer_timeout_ms: u64,
}

impl Config {
    pub fn breakers(&self) -> BreakerConfig {
        BreakerConfig {
            max_failures: self.breaker_max_failures,
            open_duration: Duration::from_millis(self.breaker_open_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicyBox {
        let floor = Duration::from_millis(self.retry_floor_ms);
        match self.max_rounds {
            Some(max_rounds) => Box::new(BoundedRetry { max_rounds, floor }),
            None => Box::new(RetryForever { floor }),
        }
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }
}
