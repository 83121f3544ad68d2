//! ECPay Broker - Library
//!
//! One-time payment broker: signed checkout redirects, webhook
//! verification, and token-gated delivery of generated files.

#[macro_use]
mod macros;

pub mod api;
pub mod config;
pub mod db;
pub mod ecpay;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
