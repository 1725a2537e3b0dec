//! Adapters behind the domain ports: the in-memory ledger and the HTTP
//! clients for payment processors and the peer replica.

pub mod http;
pub mod in_memory;
