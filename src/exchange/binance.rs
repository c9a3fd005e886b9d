use super::{ExchangeClient, ExchangeError};
use crate::config::{split_symbol, Config};
use crate::models::{OrderConfirmation, OrderRequest, OrderSide, OrderType};
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

// Binance Spot: One-Triggers-One-Cancels-the-Other order list
// Docs: https://developers.binance.com/docs/binance-spot-api-docs/rest-api/trading-endpoints
const OTOCO_PATH: &str = "/api/v3/orderList/otoco";
const API_KEY_HEADER: &str = "X-MBX-APIKEY";

type HmacSha256 = Hmac<Sha256>;

/// Binance Spot client that submits the entry and its exits as one order list.
///
/// The working order is the limit entry. Once it fills, Binance places an
/// OCO pair on the opposite side: a LIMIT_MAKER at the take-profit price
/// and a STOP_LOSS triggered at the stop-loss price.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    recv_window_ms: u64,
    price_precision: usize,
    quantity_precision: usize,
}

#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderListResponse {
    order_list_id: i64,
    list_client_order_id: String,
    list_order_status: String,
    #[serde(default)]
    orders: Vec<OrderRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRef {
    order_id: i64,
}

impl BinanceClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = &config.settings.binance_base_url;
        reqwest::Url::parse(base_url)
            .with_context(|| format!("Invalid Binance base URL {:?}", base_url))?;

        let client = Client::builder()
            .timeout(config.settings.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.credentials.binance_api_key.clone(),
            api_secret: config.credentials.binance_api_secret.clone(),
            recv_window_ms: config.settings.recv_window_ms,
            price_precision: config.settings.price_precision,
            quantity_precision: config.settings.quantity_precision,
        })
    }

    fn price(&self, value: f64) -> String {
        format!("{:.*}", self.price_precision, value)
    }

    fn quantity(&self, value: f64) -> String {
        format!("{:.*}", self.quantity_precision, value)
    }

    /// Unsigned OTOCO query string for `request`
    fn build_query(
        &self,
        request: &OrderRequest,
        timestamp_ms: i64,
        list_client_order_id: &str,
    ) -> Result<String, ExchangeError> {
        if request.side != OrderSide::Buy {
            return Err(ExchangeError::Unsupported(
                "bracket exits are only supported for buy entries".to_string(),
            ));
        }

        let symbol = split_symbol(&request.symbol)
            .map(|(base, quote)| format!("{}{}", base, quote))
            .ok_or_else(|| {
                ExchangeError::Unsupported(format!("malformed symbol {}", request.symbol))
            })?;
        let quantity = self.quantity(request.amount);

        let mut params: Vec<(&str, String)> = vec![
            ("symbol", symbol),
            ("listClientOrderId", list_client_order_id.to_string()),
            ("workingType", request.order_type.as_str().to_string()),
            ("workingSide", request.side.as_str().to_string()),
            ("workingPrice", self.price(request.price)),
            ("workingQuantity", quantity.clone()),
        ];
        if request.order_type == OrderType::Limit {
            params.push(("workingTimeInForce", "GTC".to_string()));
        }
        params.extend([
            ("pendingSide", request.side.opposite().as_str().to_string()),
            ("pendingQuantity", quantity),
            ("pendingAboveType", "LIMIT_MAKER".to_string()),
            ("pendingAbovePrice", self.price(request.take_profit())),
            ("pendingBelowType", "STOP_LOSS".to_string()),
            ("pendingBelowStopPrice", self.price(request.stop_loss())),
            ("recvWindow", self.recv_window_ms.to_string()),
            ("timestamp", timestamp_ms.to_string()),
        ]);

        Ok(params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&"))
    }
}

/// Hex HMAC-SHA256 of `payload` keyed by the API secret
pub fn sign(secret: &str, payload: &str) -> Result<String, ExchangeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    async fn create_order(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, ExchangeError> {
        let client_id = Uuid::new_v4().simple().to_string();
        let query = self.build_query(request, Utc::now().timestamp_millis(), &client_id)?;
        let signature = sign(&self.api_secret, &query)?;
        let url = format!(
            "{}{}?{}&signature={}",
            self.base_url, OTOCO_PATH, query, signature
        );

        tracing::debug!(symbol = %request.symbol, client_id = %client_id, "Submitting OTOCO order list");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = serde_json::from_str::<BinanceErrorBody>(&body).unwrap_or(BinanceErrorBody {
                code: 0,
                msg: body,
            });
            return Err(ExchangeError::Rejected {
                status: status.as_u16(),
                code: error.code,
                msg: error.msg,
            });
        }

        let raw: serde_json::Value = serde_json::from_str(&body)?;
        let list: OrderListResponse = serde_json::from_value(raw.clone())?;

        Ok(OrderConfirmation {
            id: list.order_list_id.to_string(),
            client_order_id: list.list_client_order_id,
            status: list.list_order_status,
            leg_order_ids: list.orders.iter().map(|o| o.order_id.to_string()).collect(),
            raw,
        })
    }
}
