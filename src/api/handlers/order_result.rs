//! OrderResultURL handler: the browser-facing result page.
//!
//! Purely presentational. Payment truth comes from the stored order
//! state written by the ReturnURL handler; nothing is re-verified here.

use axum::{extract::State, response::Html, Form};
use serde::Deserialize;

use crate::api::{pages, SharedState};
use crate::error::Result;
use crate::models::order::OrderStatus;
use crate::services::order_service::OrderService;
use crate::services::token_service::TokenService;
use crate::storage::GeneratedFileStore;

/// The gateway redirects with the trade number in the query (GET) or the
/// form body (POST); axum's `Form` reads from either.
#[derive(Debug, Deserialize)]
pub struct OrderResultParams {
    #[serde(rename = "MerchantTradeNo")]
    pub merchant_trade_no: Option<String>,
}

/// `GET|POST /ecpay/order_result`
pub async fn order_result(
    State(state): State<SharedState>,
    Form(params): Form<OrderResultParams>,
) -> Result<Html<String>> {
    let back_url = state.config.client_back_url.clone();

    let trade_no = params
        .merchant_trade_no
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let Some(trade_no) = trade_no else {
        return Ok(Html(pages::result_missing(&back_url)));
    };

    let orders = OrderService::new(state.db.clone());
    let Some(order) = orders.find_by_trade_no(&trade_no).await? else {
        return Ok(Html(pages::result_not_found(&trade_no, &back_url)));
    };

    let back_url = order.resume_url.clone().unwrap_or(back_url);

    if !order.is_paid() {
        let pending = order.status == OrderStatus::Created;
        return Ok(Html(pages::result_unpaid(&order, pending, &back_url)));
    }

    // Paid: surface the download link when the deliverable exists.
    let store = GeneratedFileStore::new(&state.config.generated_files_path);
    let file_path = store.deliverable_path(&order.merchant_trade_no);

    let mut download_url = None;
    if store.file_exists(&file_path).await {
        let tokens = TokenService::new(state.db.clone());
        let token = tokens
            .get_or_mint(order.id, &file_path.to_string_lossy())
            .await?;
        download_url = Some(format!("/ecpay/download/{}", token.token));
    }

    // Best-effort delivery stamp; a failed commit never blocks the page.
    if order.delivered_at.is_none() {
        if let Err(e) = orders.mark_delivered(order.id).await {
            tracing::warn!(trade_no = %trade_no, error = %e, "failed to stamp delivered_at");
        }
    }

    Ok(Html(pages::result_paid(
        &order,
        download_url.as_deref(),
        &back_url,
    )))
}
