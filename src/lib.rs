pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod receipt;
pub mod selection;
pub mod service;

pub use client::http::HttpCollectApi;
pub use client::in_memory::InMemoryCollectApi;
pub use error::{ErrorKind, RecaudaError};
pub use receipt::Receipt;
pub use selection::PaymentSelection;
pub use service::RecaudaService;

#[cfg(test)]
mod tests; // Include integration tests
