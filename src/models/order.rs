//! Order model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Order lifecycle status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Failed,
}

/// Order entity: one row per checkout attempt.
///
/// Created by the checkout initiator in `created` status, then mutated
/// exactly once by the ReturnURL handler to `paid` or `failed`. The
/// gateway echo fields (`rtn_code`, `rtn_msg`, `payment_type`,
/// `ecpay_trade_no`, `is_simulated`) exist for diagnostics.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    /// ECPay MerchantTradeNo, at most 20 characters, unique
    pub merchant_trade_no: String,
    pub app_code: String,
    pub product_code: Option<String>,
    pub item_name: String,
    pub amount: i32,
    pub status: OrderStatus,
    /// URL the payer's form page wants to resume at on pending/failed
    pub resume_url: Option<String>,
    /// Opaque serialized form data captured at checkout
    pub payload_json: Option<String>,
    pub checkmac_valid: bool,
    pub rtn_code: Option<i32>,
    pub rtn_msg: Option<String>,
    pub payment_type: Option<String>,
    pub ecpay_trade_no: Option<String>,
    pub is_simulated: bool,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Payment truth: the background notification marked the order paid
    /// AND its CheckMacValue verified. Derived, never stored.
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid && self.checkmac_valid
    }
}
