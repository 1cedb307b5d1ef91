//! HTTP boundary to the lead API
//!
//! All traffic goes through `ApiClient`; every failure is an `ApiError`.

mod client;
mod error;

pub use client::{build_http_client, ApiClient, Query};
pub use error::{ApiError, ErrorBody, ErrorKind};
