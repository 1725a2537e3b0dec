//! Domain types and the ports the application layer is written against.

pub mod breaker;
pub mod payment;
pub mod ports;
pub mod summary;
