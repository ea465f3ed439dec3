pub mod config;
pub mod engine;
pub mod error;
pub mod path;
pub mod request;
pub mod session;
