// Event Attendance - Ledger-object aggregation for the event attendance dashboard

// Core types and primitives
pub mod core;

// Read-models and form inputs
pub mod models;

// Ledger client, signer and cancellation infrastructure
pub mod infrastructure;

// Classification, projection, joins and page flows
pub mod framework;

// Placeholder HTTP endpoints
pub mod api;

// Common utilities
pub mod config;
pub mod app_state;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
