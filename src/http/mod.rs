//! HTTP server implementation for SlideKit
//!
//! Exposes the tool layer over a small REST API built with Axum: list tools,
//! call a tool with a JSON body, and report service status.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod server;

pub use models::{ApiResponse, ErrorResponse};
/// Re-export commonly used types
pub use server::{create_router, SlideKitServer};
