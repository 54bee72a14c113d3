pub mod auth;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod manager;
pub mod repository;
pub mod store;
pub mod validate;

pub use error::CoreError;
