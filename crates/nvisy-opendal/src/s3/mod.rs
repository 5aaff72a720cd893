//! Amazon S3 (and S3-compatible) backend configuration.

mod config;

pub use config::S3Config;
