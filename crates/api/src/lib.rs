//! HTTP API: router, request/response mapping, storage wiring.

pub mod app;
pub mod mapping;
pub mod middleware;
