//! Blockbook REST indexer adapter.

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::http::{
    build_http_client, malformed, optional_amount, read_json, status_error, transport_error,
    API_KEY_HEADER,
};
use super::{Balance, BlockId, BlockInfo, BroadcastResult, NodeClient, TransactionDetail, TxStatus};
use crate::amount::serde_amount;
use crate::config::NodeConfig;
use crate::error::XvgError;
use crate::network::TICKER;
use crate::types::{SignedTx, TxInput, TxOutput, Utxo};

#[derive(Debug, Deserialize)]
struct StatusResponse {
    blockbook: BlockbookStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockbookStatus {
    best_height: u64,
}

#[derive(Debug, Deserialize)]
struct BlockResponse {
    height: u64,
    time: u64,
    #[serde(default)]
    txs: Vec<BlockTx>,
}

#[derive(Debug, Deserialize)]
struct BlockTx {
    txid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressResponse {
    #[serde(with = "serde_amount")]
    balance: Decimal,
    #[serde(default = "zero", with = "serde_amount")]
    unconfirmed_balance: Decimal,
}

fn zero() -> Decimal {
    Decimal::ZERO
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxResponse {
    txid: String,
    #[serde(default)]
    vin: Vec<TxEndpoint>,
    #[serde(default)]
    vout: Vec<TxEndpoint>,
    #[serde(default)]
    confirmations: u64,
    block_height: Option<u64>,
    block_time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TxEndpoint {
    #[serde(default)]
    addresses: Option<Vec<String>>,
    #[serde(default)]
    value: Value,
}

impl TxEndpoint {
    /// Entries without addresses or value (e.g. OP_RETURN) are skipped.
    fn normalize(&self) -> Option<Result<(String, Decimal), XvgError>> {
        let addresses = self.addresses.as_ref()?;
        if self.value.is_null() {
            return None;
        }
        let address = addresses
            .first()
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        Some(optional_amount(&self.value).map(|value| (address, value)))
    }
}

/// Client for a Blockbook instance at `{url}/api/{version}`.
pub struct BlockbookClient {
    name: String,
    base: String,
    api_key: Option<String>,
    confirmation_limit: u64,
    http: reqwest::Client,
}

impl BlockbookClient {
    pub fn new(name: impl Into<String>, config: &NodeConfig) -> Result<Self, XvgError> {
        Ok(Self {
            name: name.into(),
            base: format!(
                "{}/api/{}",
                config.url.trim_end_matches('/'),
                config.api_version
            ),
            api_key: config.api_key.clone(),
            confirmation_limit: config.confirmation_limit,
            http: build_http_client(config)?,
        })
    }

    async fn get_value(&self, path: &str) -> Result<Value, XvgError> {
        self.fetch(path).await.map_err(|e| {
            if matches!(e, XvgError::Network { .. }) {
                warn!(node = %self.name, path, error = %e, "blockbook request failed");
            }
            e
        })
    }

    async fn fetch(&self, path: &str) -> Result<Value, XvgError> {
        let endpoint = format!("{}{path}", self.base);
        debug!(node = %self.name, %endpoint, "blockbook request");
        let mut builder = self.http.get(&endpoint);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&endpoint, e))?;
        let (status, body) = read_json(&endpoint, response).await?;
        if status.is_success() {
            return Ok(body);
        }
        let detail = body.get("error").and_then(Value::as_str);
        if status == StatusCode::NOT_FOUND {
            return Err(XvgError::NotFound(detail.unwrap_or(path).to_string()));
        }
        Err(status_error(&endpoint, status, detail))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, XvgError> {
        let body = self.get_value(path).await?;
        serde_json::from_value(body)
            .map_err(|e| malformed(&format!("{}{path}", self.base), &e.to_string()))
    }
}

#[async_trait]
impl NodeClient for BlockbookClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_height(&self) -> Result<u64, XvgError> {
        let status: StatusResponse = self.get("").await?;
        Ok(status.blockbook.best_height)
    }

    async fn get_block(&self, id: BlockId) -> Result<BlockInfo, XvgError> {
        let block: BlockResponse = self.get(&format!("/block/{id}")).await?;
        let transactions = block
            .txs
            .into_iter()
            .map(|tx| TransactionDetail {
                hash: tx.txid,
                ticker: TICKER.to_string(),
                from: Vec::new(),
                to: Vec::new(),
                status: TxStatus::Unknown,
                height: Some(block.height),
                timestamp: Some(block.time),
                confirmations: 0,
            })
            .collect();
        Ok(BlockInfo {
            height: block.height,
            timestamp: block.time,
            transactions,
        })
    }

    async fn balance_by_address(&self, address: &str) -> Result<Balance, XvgError> {
        let info: AddressResponse = self.get(&format!("/address/{address}")).await?;
        let total_balance = info
            .balance
            .checked_add(info.unconfirmed_balance)
            .ok_or_else(|| XvgError::InvalidParams("amount overflow".into()))?;
        Ok(Balance {
            balance: info.balance,
            total_balance,
        })
    }

    async fn tx_by_hash(&self, hash: &str) -> Result<TransactionDetail, XvgError> {
        let tx: TxResponse = self.get(&format!("/tx/{hash}")).await?;
        let from = tx
            .vin
            .iter()
            .filter_map(TxEndpoint::normalize)
            .map(|r| r.map(|(address, value)| TxInput::new(address, value)))
            .collect::<Result<Vec<_>, _>>()?;
        let to = tx
            .vout
            .iter()
            .filter_map(TxEndpoint::normalize)
            .map(|r| r.map(|(address, value)| TxOutput::new(address, value)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TransactionDetail {
            hash: tx.txid,
            ticker: TICKER.to_string(),
            from,
            to,
            status: TxStatus::from_confirmations(tx.confirmations, self.confirmation_limit),
            height: tx.block_height,
            timestamp: tx.block_time,
            confirmations: tx.confirmations,
        })
    }

    async fn utxo_by_address(&self, address: &str) -> Result<Vec<Utxo>, XvgError> {
        let body = self.get_value(&format!("/utxo/{address}")).await?;
        // Stock Blockbook answers with a bare array; some deployments wrap it.
        let list = match body {
            Value::Object(mut map) => map.remove("utxos").unwrap_or(Value::Null),
            other => other,
        };
        let mut utxos: Vec<Utxo> = serde_json::from_value(list)
            .map_err(|e| malformed(&self.base, &format!("utxo list: {e}")))?;
        for utxo in utxos.iter_mut().filter(|u| u.address.is_empty()) {
            utxo.address = address.to_string();
        }
        Ok(utxos)
    }

    async fn tx_broadcast(&self, signed: &SignedTx) -> Result<BroadcastResult, XvgError> {
        let payload = signed.broadcast_payload();
        let outcome = self.get_value(&format!("/sendtx/{payload}")).await;
        match outcome {
            Ok(body) => match (body["result"].as_str(), body["error"].as_str()) {
                (Some(hash), _) => {
                    info!(node = %self.name, hash, "transaction broadcast");
                    Ok(BroadcastResult::Accepted {
                        hash: hash.to_string(),
                    })
                }
                (None, Some(error)) => Ok(BroadcastResult::Rejected {
                    error: format!("Error broadcasting transaction: {error}"),
                }),
                (None, None) => Ok(BroadcastResult::Rejected {
                    error: "Error broadcasting transaction: empty response".to_string(),
                }),
            },
            Err(e) => {
                warn!(node = %self.name, error = %e, "broadcast rejected");
                Ok(BroadcastResult::Rejected {
                    error: format!("Error broadcasting transaction: {e}"),
                })
            }
        }
    }
}
