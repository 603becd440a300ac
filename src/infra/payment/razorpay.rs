use crate::domain::ports::{PaymentGateway, PaymentOrder};
use crate::error::AppError;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::info;

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

type HmacSha256 = Hmac<Sha256>;

pub struct RazorpayGateway {
    client: Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            client: Client::new(),
            key_id,
            key_secret,
        }
    }
}

#[derive(Serialize)]
struct OrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Hex HMAC-SHA256 of `order_id|payment_id`, the checkout signature scheme.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Compares the expected and supplied signatures via `Mac::verify_slice`.
pub fn signature_matches(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> String {
        self.key_id.clone()
    }

    async fn create_order(&self, amount: i64, currency: &str, receipt: &str) -> Result<PaymentOrder, AppError> {
        let res = self.client.post(ORDERS_URL)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&OrderRequest { amount, currency, receipt })
            .send()
            .await
            .map_err(|e| AppError::InternalWithMsg(format!("Payment gateway connection error: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AppError::InternalWithMsg(format!("Payment gateway rejected order. Status: {}, Body: {}", status, text)));
        }

        let order: OrderResponse = res.json().await
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid payment gateway response: {}", e)))?;

        info!(order_id = %order.id, amount = order.amount, receipt, "Payment order created");
        Ok(PaymentOrder { id: order.id, amount: order.amount, currency: order.currency })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature_matches(&self.key_secret, order_id, payment_id, signature)
    }
}
