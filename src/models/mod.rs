//! Response models for the administrative API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing the admin endpoints' HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{ClearResponse, EntrySummary, ErrorResponse, HealthResponse, StatusResponse};
