//! Checkout initiation handler.
//!
//! Creates the order, signs the gateway parameter set, and returns a
//! self-submitting form that sends the payer's browser to the gateway.

use axum::{extract::State, response::Html, Form};
use std::collections::{BTreeMap, HashMap};

use crate::api::{pages, SharedState};
use crate::ecpay::EcpayClient;
use crate::error::{AppError, Result};
use crate::services::order_service::{self, NewOrder, OrderService};

const DEFAULT_AMOUNT: i32 = 50;

/// Form fields with dedicated meaning; everything else is bundled into
/// `payload_json` when no explicit payload is submitted.
const CHECKOUT_FIELDS: [&str; 5] = [
    "amount",
    "item_name",
    "resume_url",
    "payload_json",
    "product_code",
];

/// `POST /ecpay/create`
pub async fn create(
    State(state): State<SharedState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Html<String>> {
    let config = &state.config;

    let field = |name: &str| {
        form.get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let amount: i32 = match field("amount") {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Validation(format!("invalid amount: {}", raw)))?,
        None => DEFAULT_AMOUNT,
    };
    let item_name = field("item_name").unwrap_or("One-time purchase").to_string();
    let resume_url = field("resume_url")
        .map(str::to_string)
        .unwrap_or_else(|| config.client_back_url.clone());
    let product_code = field("product_code").map(str::to_string);
    let payload_json = match field("payload_json") {
        Some(payload) => payload.to_string(),
        None => {
            let extra: BTreeMap<&str, &str> = form
                .iter()
                .filter(|(k, _)| !CHECKOUT_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            serde_json::to_string(&extra)?
        }
    };

    let trade_no = order_service::generate_trade_no(&config.trade_no_prefix);

    // Persisted before the redirect form is returned, so the ReturnURL
    // handler always finds the order.
    let orders = OrderService::new(state.db.clone());
    orders
        .create_order(NewOrder {
            merchant_trade_no: trade_no.clone(),
            app_code: config.app_code.clone(),
            product_code,
            item_name: item_name.clone(),
            amount,
            resume_url: Some(resume_url),
            payload_json: Some(payload_json),
        })
        .await?;

    tracing::info!(trade_no = %trade_no, amount, "order created, redirecting to gateway");

    // MerchantTradeDate is server local time in the gateway's format
    let trade_date = chrono::Local::now().format("%Y/%m/%d %H:%M:%S").to_string();

    let mut params: Vec<(String, String)> = vec![
        ("MerchantID".into(), config.merchant_id.clone()),
        ("MerchantTradeNo".into(), trade_no),
        ("MerchantTradeDate".into(), trade_date),
        ("PaymentType".into(), "aio".into()),
        ("TotalAmount".into(), amount.to_string()),
        ("TradeDesc".into(), "One-time payment".into()),
        ("ItemName".into(), item_name),
        ("ReturnURL".into(), config.notify_url.clone()),
        ("OrderResultURL".into(), config.order_result_url.clone()),
        ("ClientBackURL".into(), config.client_back_url.clone()),
        ("ChoosePayment".into(), config.choose_payment.clone()),
        ("EncryptType".into(), "1".into()),
    ];

    let client = EcpayClient::from_config(config);
    let check_mac = client.generate_check_value(&params);
    params.push(("CheckMacValue".into(), check_mac));

    Ok(Html(pages::auto_post_form(&config.service_url, &params)))
}
