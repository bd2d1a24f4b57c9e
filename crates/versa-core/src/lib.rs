//! Domain model, error taxonomy and port traits for the VERSA client.
//!
//! This crate has no I/O of its own. The HTTP gateway lives in
//! `versa-interaction`, storage in `versa-infrastructure`, and the state
//! machines that tie them together in `versa-application`.

pub mod api;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;
pub mod persistence;
pub mod timestamp;
pub mod user;
pub mod workspace;

// Re-export common error type
pub use error::{Result, VersaError};
