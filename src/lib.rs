//! Agent task coordinator for a farmer-facing crop diagnosis service.
//!
//! Tasks are persisted in a document store, routed to one of five agent
//! executors, retried with exponential backoff and recorded in an
//! append-only decision log.

pub mod agents;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod errors;
pub mod llm;
pub mod models;
pub mod notify;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
