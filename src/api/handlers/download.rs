//! Download gate: validates a capability token and streams the file.

use axum::extract::{Path, State};
use chrono::{DateTime, Utc};

use crate::api::download_response::AttachmentResponse;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::download_token::DownloadToken;
use crate::models::order::Order;
use crate::services::order_service::OrderService;
use crate::services::token_service::TokenService;
use crate::storage::{download_filename, GeneratedFileStore, DOCX_CONTENT_TYPE};

/// `GET /ecpay/download/:token`
pub async fn download(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<AttachmentResponse> {
    let tokens = TokenService::new(state.db.clone());
    let Some(download_token) = tokens.find(&token).await? else {
        return Err(AppError::NotFound("download token not found".into()));
    };

    let orders = OrderService::new(state.db.clone());
    let order = orders.find_by_id(download_token.order_id).await?;
    let order = authorize(&download_token, order.as_ref(), Utc::now())?;

    let store = GeneratedFileStore::new(&state.config.generated_files_path);
    let file_path = std::path::Path::new(&download_token.file_path);
    if !store.file_exists(file_path).await {
        return Err(AppError::NotFound("deliverable file not found".into()));
    }
    let data = store.read(file_path).await?;

    Ok(AttachmentResponse::new(
        data,
        DOCX_CONTENT_TYPE,
        download_filename(&order.merchant_trade_no),
    ))
}

/// Token and order checks, in order: expiry (410) before order state
/// (403). Missing orders are indistinguishable from unpaid ones.
fn authorize<'a>(
    token: &DownloadToken,
    order: Option<&'a Order>,
    now: DateTime<Utc>,
) -> Result<&'a Order> {
    if token.is_expired(now) {
        return Err(AppError::Gone("download token expired".into()));
    }
    match order {
        Some(order) if order.is_paid() => Ok(order),
        _ => Err(AppError::Forbidden("order is not paid".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderStatus;
    use chrono::Duration;

    fn token_expiring_at(expires_at: DateTime<Utc>) -> DownloadToken {
        DownloadToken {
            token: "tok".to_string(),
            order_id: 1,
            file_path: "/opt/app/generated/CT173000000042.docx".to_string(),
            created_at: Utc::now(),
            expires_at,
        }
    }

    fn order(status: OrderStatus, checkmac_valid: bool) -> Order {
        Order {
            id: 1,
            merchant_trade_no: "CT173000000042".to_string(),
            app_code: String::new(),
            product_code: None,
            item_name: "Widget".to_string(),
            amount: 100,
            status,
            resume_url: None,
            payload_json: None,
            checkmac_valid,
            rtn_code: None,
            rtn_msg: None,
            payment_type: None,
            ecpay_trade_no: None,
            is_simulated: false,
            created_at: Utc::now(),
            paid_at: None,
            delivered_at: None,
        }
    }

    #[test]
    fn test_live_token_on_paid_order_passes() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::hours(1));
        let paid = order(OrderStatus::Paid, true);
        assert!(authorize(&token, Some(&paid), now).is_ok());
    }

    #[test]
    fn test_expired_token_is_gone_even_for_paid_order() {
        let now = Utc::now();
        let token = token_expiring_at(now - Duration::seconds(1));
        let paid = order(OrderStatus::Paid, true);
        assert!(matches!(
            authorize(&token, Some(&paid), now),
            Err(AppError::Gone(_))
        ));
    }

    #[test]
    fn test_live_token_on_unpaid_order_is_forbidden() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::hours(1));
        let created = order(OrderStatus::Created, false);
        assert!(matches!(
            authorize(&token, Some(&created), now),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_paid_status_without_valid_signature_is_forbidden() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::hours(1));
        let unverified = order(OrderStatus::Paid, false);
        assert!(matches!(
            authorize(&token, Some(&unverified), now),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_missing_order_is_forbidden() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::hours(1));
        assert!(matches!(
            authorize(&token, None, now),
            Err(AppError::Forbidden(_))
        ));
    }
}
