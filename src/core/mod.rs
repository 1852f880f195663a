pub mod config;
pub mod error;
pub mod exchange;
pub mod types;
