//! Client for the rate-limited remote social API and the live
//! [`infl_core::DataSource`] built on it.

mod client;
mod error;
mod retry;
mod source;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use retry::RetryPolicy;
pub use source::LiveSource;
