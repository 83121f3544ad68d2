//! ReturnURL handler: the gateway's server-to-server payment notification.
//!
//! This endpoint is the source of truth for payment state. The gateway
//! expects a literal plain-text acknowledgment: `1|OK` to stop retrying,
//! `0|<reason>` to retry later. Rejections are protocol responses, never
//! HTTP errors.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use std::collections::HashMap;

use crate::api::SharedState;
use crate::ecpay::EcpayClient;
use crate::services::order_service::{GatewayNotification, OrderService};

/// `POST /ecpay/return`
pub async fn notify_return(
    State(state): State<SharedState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let trade_no = form
        .get("MerchantTradeNo")
        .map(|v| v.trim().to_string())
        .unwrap_or_default();
    if trade_no.is_empty() {
        return ack_failure("Missing MerchantTradeNo");
    }

    let client = EcpayClient::from_config(&state.config);
    if !client.verify(&form) {
        tracing::warn!(trade_no = %trade_no, "gateway notification failed CheckMacValue verification");
        return ack_failure("CheckMacValue Error");
    }

    let orders = OrderService::new(state.db.clone());
    let order = match orders.find_by_trade_no(&trade_no).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            tracing::warn!(trade_no = %trade_no, "gateway notification for unknown order");
            return ack_failure("Order Not Found");
        }
        Err(e) => {
            tracing::error!(trade_no = %trade_no, error = %e, "order lookup failed");
            return ack_failure("DB Error");
        }
    };

    let notification = GatewayNotification::from_form(&form);
    match orders.apply_notification(order.id, &notification).await {
        Ok(order) => {
            tracing::info!(
                trade_no = %trade_no,
                rtn_code = notification.rtn_code,
                status = ?order.status,
                "gateway notification recorded"
            );
            ack_success()
        }
        Err(e) => {
            // Rolled back; the gateway will retry the notification.
            tracing::error!(trade_no = %trade_no, error = %e, "failed to record gateway notification");
            ack_failure("DB Error")
        }
    }
}

fn ack_success() -> Response {
    plain_text("1|OK".to_string())
}

fn ack_failure(reason: &str) -> Response {
    plain_text(format!("0|{}", reason))
}

fn plain_text(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        body,
    )
        .into_response()
}
