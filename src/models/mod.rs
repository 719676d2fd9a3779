//! Request and Response models for the cache HTTP surface
//!
//! DTOs used for query strings and JSON response bodies. Payloads travel
//! as raw request/response bodies and are not modelled here.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{TtlParams, ValidateParams};
pub use responses::{
    ClearResponse, ErrorResponse, EvictResponse, HealthResponse, PutResponse, RefreshResponse,
    StatsResponse, ValidateResponse,
};
