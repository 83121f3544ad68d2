//! ECPay CheckMacValue client.
//!
//! Replaces the gateway's vendor SDK with a linked implementation of the
//! same keyed-checksum scheme: parameters sorted case-insensitively, framed
//! by HashKey/HashIV, quote-plus encoded with the gateway's safe set,
//! lowercased, then SHA-256 hashed to uppercase hex.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::config::Config;

/// Signature client bound to one merchant's credentials.
#[derive(Clone)]
pub struct EcpayClient {
    merchant_id: String,
    hash_key: String,
    hash_iv: String,
}

redacted_debug!(EcpayClient {
    show merchant_id,
    redact hash_key,
    redact hash_iv,
});

impl EcpayClient {
    pub fn new(
        merchant_id: impl Into<String>,
        hash_key: impl Into<String>,
        hash_iv: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            hash_key: hash_key.into(),
            hash_iv: hash_iv.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.merchant_id, &config.hash_key, &config.hash_iv)
    }

    /// Compute the CheckMacValue over a parameter set.
    ///
    /// Any submitted `CheckMacValue` entry is ignored, and `MerchantID` is
    /// supplied from the client's credentials when absent.
    pub fn generate_check_value(&self, params: &[(String, String)]) -> String {
        let payload = self.checkable_payload(params);
        let digest = Sha256::digest(payload.as_bytes());
        hex::encode_upper(digest)
    }

    /// Verify the `CheckMacValue` of an incoming gateway form.
    ///
    /// Comparison is case-insensitive; a missing or empty value fails.
    pub fn verify(&self, form: &HashMap<String, String>) -> bool {
        let sent = form
            .get("CheckMacValue")
            .map(|s| s.trim())
            .unwrap_or_default();
        if sent.is_empty() {
            return false;
        }

        let pairs: Vec<(String, String)> = form
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.generate_check_value(&pairs).eq_ignore_ascii_case(sent)
    }

    /// Build the encoded, lowercased string that gets hashed.
    fn checkable_payload(&self, params: &[(String, String)]) -> String {
        let mut items: Vec<(&str, &str)> = params
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case("CheckMacValue"))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if !items.iter().any(|(k, _)| *k == "MerchantID") {
            items.push(("MerchantID", self.merchant_id.as_str()));
        }
        items.sort_by_key(|(k, _)| k.to_ascii_lowercase());

        let joined = items
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let raw = format!("HashKey={}&{}&HashIV={}", self.hash_key, joined, self.hash_iv);

        quote_plus(&raw).to_lowercase()
    }
}

/// Percent-encode with the gateway's expected variant: space becomes `+`
/// and `-_.!*()~` stay literal.
fn quote_plus(input: &str) -> String {
    urlencoding::encode(input)
        .replace("%20", "+")
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%28", "(")
        .replace("%29", ")")
}
