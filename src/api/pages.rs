//! Server-rendered pages: the checkout auto-post form and the order
//! result views. Small enough that a templating engine would be noise;
//! everything user-controlled is escaped before interpolation.

use crate::models::order::Order;

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width,initial-scale=1"/>
  <title>{title}</title>
</head>
<body style="font-family:system-ui,-apple-system,Segoe UI,Roboto;padding:16px;">
{body}
</body>
</html>"#,
        title = escape_html(title),
        body = body,
    )
}

/// Self-submitting form that POSTs the signed parameter set to the
/// gateway's checkout endpoint.
pub fn auto_post_form(action_url: &str, params: &[(String, String)]) -> String {
    let inputs = params
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<input type="hidden" name="{}" value="{}"/>"#,
                escape_html(name),
                escape_html(value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n    ");

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width,initial-scale=1"/>
  <title>Redirecting to payment&hellip;</title>
</head>
<body>
  <p style="font-family:system-ui,-apple-system,Segoe UI,Roboto;padding:16px;">Redirecting to the payment page&hellip;</p>
  <form id="ecpayForm" method="POST" action="{action}">
    {inputs}
  </form>
  <script>document.getElementById('ecpayForm').submit();</script>
</body>
</html>"#,
        action = escape_html(action_url),
        inputs = inputs,
    )
}

fn back_link(back_url: &str) -> String {
    format!(
        r#"<p><a href="{}">Back to the form</a></p>"#,
        escape_html(back_url)
    )
}

fn order_details(order: &Order) -> String {
    let mut rows = vec![
        format!(
            "<dt>Order</dt><dd>{}</dd>",
            escape_html(&order.merchant_trade_no)
        ),
        format!("<dt>Amount</dt><dd>{}</dd>", order.amount),
    ];
    if let Some(payment_type) = &order.payment_type {
        rows.push(format!(
            "<dt>Payment method</dt><dd>{}</dd>",
            escape_html(payment_type)
        ));
    }
    if let Some(rtn_code) = order.rtn_code {
        let rtn_msg = order.rtn_msg.as_deref().unwrap_or("");
        rows.push(format!(
            "<dt>Gateway response</dt><dd>{} {}</dd>",
            rtn_code,
            escape_html(rtn_msg)
        ));
    }
    format!("<dl>{}</dl>", rows.join(""))
}

/// No trade number was supplied in the redirect.
pub fn result_missing(back_url: &str) -> String {
    page_shell(
        "Order result",
        &format!(
            "<h1>Order not specified</h1>\n<p>The payment result did not include an order number.</p>\n{}",
            back_link(back_url)
        ),
    )
}

/// The trade number does not match any order.
pub fn result_not_found(merchant_trade_no: &str, back_url: &str) -> String {
    page_shell(
        "Order result",
        &format!(
            "<h1>Order not found</h1>\n<p>No order matches <code>{}</code>.</p>\n{}",
            escape_html(merchant_trade_no),
            back_link(back_url)
        ),
    )
}

/// The order exists but is not confirmed paid: pending while the gateway
/// has not reported back, failed otherwise.
pub fn result_unpaid(order: &Order, pending: bool, back_url: &str) -> String {
    let (heading, note) = if pending {
        (
            "Payment pending",
            "We have not received the payment confirmation yet. Refresh in a moment.",
        )
    } else {
        ("Payment failed", "The payment was not completed.")
    };
    page_shell(
        "Order result",
        &format!(
            "<h1>{}</h1>\n<p>{}</p>\n{}\n{}",
            heading,
            note,
            order_details(order),
            back_link(back_url)
        ),
    )
}

/// The order is confirmed paid; the download link is shown when the
/// deliverable exists.
pub fn result_paid(order: &Order, download_url: Option<&str>, back_url: &str) -> String {
    let delivery = match download_url {
        Some(url) => format!(
            r#"<p><a href="{}" download>Download your file</a> (link valid for 24 hours)</p>"#,
            escape_html(url)
        ),
        None => "<p>Your file is being prepared.</p>".to_string(),
    };
    page_shell(
        "Order result",
        &format!(
            "<h1>Payment complete</h1>\n{}\n{}\n{}",
            order_details(order),
            delivery,
            back_link(back_url)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderStatus;
    use chrono::Utc;

    fn paid_order() -> Order {
        Order {
            id: 1,
            merchant_trade_no: "CT173000000042".to_string(),
            app_code: "demo".to_string(),
            product_code: None,
            item_name: "Widget".to_string(),
            amount: 100,
            status: OrderStatus::Paid,
            resume_url: None,
            payload_json: None,
            checkmac_valid: true,
            rtn_code: Some(1),
            rtn_msg: Some("Succeeded".to_string()),
            payment_type: Some("Credit_CreditCard".to_string()),
            ecpay_trade_no: Some("2503121530234567".to_string()),
            is_simulated: false,
            created_at: Utc::now(),
            paid_at: Some(Utc::now()),
            delivered_at: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_auto_post_form_contains_hidden_inputs_and_submit() {
        let params = vec![
            ("MerchantTradeNo".to_string(), "CT173000000042".to_string()),
            ("ItemName".to_string(), r#"Widget "deluxe""#.to_string()),
        ];
        let html = auto_post_form("https://gateway.example/AioCheckOut/V5", &params);

        assert!(html.contains(r#"action="https://gateway.example/AioCheckOut/V5""#));
        assert!(html.contains(r#"name="MerchantTradeNo" value="CT173000000042""#));
        // attribute values are escaped
        assert!(html.contains("Widget &quot;deluxe&quot;"));
        assert!(!html.contains(r#"value="Widget "deluxe"""#));
        assert!(html.contains("document.getElementById('ecpayForm').submit()"));
    }

    #[test]
    fn test_result_paid_with_download_link() {
        let html = result_paid(&paid_order(), Some("/ecpay/download/tok123"), "https://app/");
        assert!(html.contains("Payment complete"));
        assert!(html.contains(r#"href="/ecpay/download/tok123""#));
        assert!(html.contains("CT173000000042"));
    }

    #[test]
    fn test_result_paid_without_file_has_no_link() {
        let html = result_paid(&paid_order(), None, "https://app/");
        assert!(html.contains("being prepared"));
        assert!(!html.contains("/ecpay/download/"));
    }

    #[test]
    fn test_result_unpaid_pending_vs_failed() {
        let mut order = paid_order();
        order.status = OrderStatus::Created;
        order.checkmac_valid = false;

        let pending = result_unpaid(&order, true, "https://app/");
        assert!(pending.contains("Payment pending"));

        let failed = result_unpaid(&order, false, "https://app/");
        assert!(failed.contains("Payment failed"));
    }

    #[test]
    fn test_result_missing_and_not_found_link_back() {
        let missing = result_missing("https://app/form");
        assert!(missing.contains(r#"href="https://app/form""#));

        let not_found = result_not_found("CTxxx", "https://app/form");
        assert!(not_found.contains("CTxxx"));
        assert!(not_found.contains(r#"href="https://app/form""#));
    }
}
