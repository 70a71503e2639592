pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::NeosecError;
pub use crate::core::services::NeosecService;
pub use infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests; // Service and API tests
