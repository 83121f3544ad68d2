//! Order service.
//!
//! Owns the orders table: trade number generation, checkout persistence,
//! and the single lifecycle transition applied by the ReturnURL handler.

use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::models::order::{Order, OrderStatus};

/// Fields captured at checkout initiation
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub merchant_trade_no: String,
    pub app_code: String,
    pub product_code: Option<String>,
    pub item_name: String,
    pub amount: i32,
    pub resume_url: Option<String>,
    pub payload_json: Option<String>,
}

/// Verified payment notification from the gateway.
///
/// Only constructed after the CheckMacValue passed; the signature itself
/// is not part of the notification.
#[derive(Debug, Clone)]
pub struct GatewayNotification {
    pub rtn_code: i32,
    pub rtn_msg: Option<String>,
    pub payment_type: Option<String>,
    pub ecpay_trade_no: Option<String>,
    pub is_simulated: bool,
}

impl GatewayNotification {
    /// Extract the notification fields from the gateway's form POST.
    /// Unparseable or absent RtnCode counts as 0 (not a success).
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let field = |name: &str| {
            form.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            rtn_code: field("RtnCode")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            rtn_msg: field("RtnMsg"),
            payment_type: field("PaymentType"),
            ecpay_trade_no: field("TradeNo"),
            is_simulated: field("SimulatePaid").as_deref() == Some("1"),
        }
    }
}

/// Status a verified notification moves the order to. Return code 1 is the
/// gateway's only success value.
pub fn notification_transition(rtn_code: i32) -> OrderStatus {
    if rtn_code == 1 {
        OrderStatus::Paid
    } else {
        OrderStatus::Failed
    }
}

/// Generate a MerchantTradeNo: sanitized prefix + epoch seconds + 2-digit
/// random suffix, truncated to 20 characters.
pub fn generate_trade_no(prefix: &str) -> String {
    let suffix: u8 = rand::rng().random_range(0..100);
    build_trade_no(prefix, Utc::now().timestamp(), suffix)
}

fn build_trade_no(prefix: &str, epoch_secs: i64, suffix: u8) -> String {
    let prefix: String = prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect();

    let mut trade_no = format!("{}{}{:02}", prefix, epoch_secs, suffix);
    trade_no.truncate(20);
    trade_no
}

/// Order persistence service
pub struct OrderService {
    db: PgPool,
}

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Persist a new order in `created` status.
    pub async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (merchant_trade_no, app_code, product_code, item_name, amount,
                 status, resume_url, payload_json)
            VALUES ($1, $2, $3, $4, $5, 'created', $6, $7)
            RETURNING *
            "#,
        )
        .bind(&new_order.merchant_trade_no)
        .bind(&new_order.app_code)
        .bind(&new_order.product_code)
        .bind(&new_order.item_name)
        .bind(new_order.amount)
        .bind(&new_order.resume_url)
        .bind(&new_order.payload_json)
        .fetch_one(&self.db)
        .await?;

        Ok(order)
    }

    pub async fn find_by_trade_no(&self, merchant_trade_no: &str) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE merchant_trade_no = $1",
        )
        .bind(merchant_trade_no)
        .fetch_optional(&self.db)
        .await?;

        Ok(order)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(order)
    }

    /// Apply a verified gateway notification to an order.
    ///
    /// Runs in its own transaction, committed once. Re-delivery of the same
    /// notification re-applies the update (last-write-wins); `paid_at` is
    /// only stamped on the paid transition and otherwise left untouched.
    pub async fn apply_notification(
        &self,
        order_id: i64,
        notification: &GatewayNotification,
    ) -> Result<Order> {
        let status = notification_transition(notification.rtn_code);

        let mut tx = self.db.begin().await?;
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2,
                checkmac_valid = TRUE,
                rtn_code = $3,
                rtn_msg = $4,
                payment_type = $5,
                ecpay_trade_no = $6,
                is_simulated = $7,
                paid_at = CASE WHEN $8 THEN NOW() ELSE paid_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(notification.rtn_code)
        .bind(&notification.rtn_msg)
        .bind(&notification.payment_type)
        .bind(&notification.ecpay_trade_no)
        .bind(notification.is_simulated)
        .bind(status == OrderStatus::Paid)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", order_id)))?;
        tx.commit().await?;

        Ok(order)
    }

    /// Stamp `delivered_at` the first time a paid result is shown.
    /// Subsequent calls are no-ops.
    pub async fn mark_delivered(&self, order_id: i64) -> Result<()> {
        sqlx::query("UPDATE orders SET delivered_at = NOW() WHERE id = $1 AND delivered_at IS NULL")
            .bind(order_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
