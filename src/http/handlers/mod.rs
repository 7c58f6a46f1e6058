//! HTTP request handlers

pub mod status;
pub mod tools;

// Re-export AppState (used by all handlers)
pub use status::AppState;
