//! # Voice Banking Assistant
//!
//! A voice front-end for two fixed account balances.
//!
//! ## Application Architecture:
//! - **config**: Application configuration (TOML files + environment variables)
//! - **ledger**: The immutable account balances
//! - **responder**: Keyword matching from a query to a canned reply
//! - **state**: Shared server state and request metrics
//! - **health**: Health and metrics endpoints
//! - **handlers**: HTTP request handlers and the route table
//! - **middleware**: Request logging and metrics collection
//! - **error**: Server error types and their HTTP responses
//! - **client**: The voice session controller and its runtime

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ledger;
pub mod middleware;
pub mod responder;
pub mod state;
