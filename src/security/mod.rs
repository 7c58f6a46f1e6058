//! Security utilities for slidekit

pub mod path;

pub use path::{canonicalize_lenient, sanitize_path, PathSecurityError};
