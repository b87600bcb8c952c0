pub mod config;
pub mod metrics;
pub mod package;
pub mod runtime;
pub mod server;
pub mod vdb;
