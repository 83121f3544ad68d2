//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// ECPay merchant identifier
    pub merchant_id: String,

    /// ECPay HashKey, used only for CheckMacValue computation
    pub hash_key: String,

    /// ECPay HashIV, used only for CheckMacValue computation
    pub hash_iv: String,

    /// Gateway checkout endpoint the payer's browser is redirected to
    pub service_url: String,

    /// ReturnURL: server-to-server payment notification callback
    pub notify_url: String,

    /// OrderResultURL: browser-facing result redirect
    pub order_result_url: String,

    /// ClientBackURL: where the payer can navigate back to
    pub client_back_url: String,

    /// Payment-method filter passed as ChoosePayment (e.g. "ALL", "Credit")
    pub choose_payment: String,

    /// Identifier of the app that creates orders through this broker
    pub app_code: String,

    /// Prefix for generated trade numbers
    pub trade_no_prefix: String,

    /// Directory holding deliverable files, one per trade number
    pub generated_files_path: String,
}

redacted_debug!(Config {
    show database_url,
    show bind_address,
    show merchant_id,
    redact hash_key,
    redact hash_iv,
    show service_url,
    show notify_url,
    show order_result_url,
    show client_back_url,
    show choose_payment,
    show app_code,
    show trade_no_prefix,
    show generated_files_path,
});

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            merchant_id: require("ECPAY_MERCHANT_ID")?,
            hash_key: require("ECPAY_HASH_KEY")?,
            hash_iv: require("ECPAY_HASH_IV")?,
            service_url: require("ECPAY_SERVICE_URL")?,
            notify_url: require("ECPAY_NOTIFY_URL")?,
            order_result_url: require("ECPAY_ORDER_RESULT_URL")?,
            client_back_url: require("ECPAY_CLIENT_BACK_URL")?,
            choose_payment: env::var("ECPAY_CHOOSE_PAYMENT").unwrap_or_else(|_| "ALL".into()),
            app_code: env::var("APP_CODE").unwrap_or_default(),
            trade_no_prefix: env::var("APP_TRADE_NO_PREFIX").unwrap_or_else(|_| "NO".into()),
            generated_files_path: env::var("GENERATED_FILES_PATH")
                .unwrap_or_else(|_| "/opt/app/generated".into()),
        })
    }
}

/// Read a required environment variable, rejecting empty values.
fn require(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Config(format!("{} not set", key))),
    }
}
