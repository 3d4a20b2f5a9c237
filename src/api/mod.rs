//! Route handlers, one module per route group

pub mod auth;
pub mod buckets;
pub mod files;
