//! bucket-bridge: a thin HTTP gateway in front of an S3-compatible object
//! store. Callers supply storage credentials on every request; the gateway
//! translates them into short-lived storage clients and reshapes provider
//! responses into a simple JSON contract. It holds no durable state of its
//! own.

pub mod config;
pub mod error;
pub mod models;
pub mod storage;
