//! Bitcoin-style JSON-RPC node adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::http::{
    build_http_client, malformed, optional_amount, read_json, status_error, transport_error,
    API_KEY_HEADER,
};
use super::{Balance, BlockId, BlockInfo, BroadcastResult, NodeClient, TransactionDetail, TxStatus};
use crate::amount::checked_sum;
use crate::config::NodeConfig;
use crate::error::XvgError;
use crate::network::TICKER;
use crate::types::{SignedTx, TxInput, TxOutput, Utxo};

/// `RPC_INVALID_ADDRESS_OR_KEY`, returned for unknown transactions and blocks.
const RPC_NOT_FOUND: i64 = -5;

/// Network name the UTXO proxy expects.
const PROXY_NETWORK: &str = "xvg";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct ProxyUtxos {
    utxos: Vec<Utxo>,
}

/// JSON-RPC 1.0 client for a Verge daemon or a hosted node (NowNodes).
///
/// UTXOs come from the configured UTXO proxy when one is set, otherwise from
/// `listunspent`.
pub struct RpcNodeClient {
    name: String,
    url: String,
    api_key: Option<String>,
    confirmation_limit: u64,
    utxo_proxy_url: Option<String>,
    http: reqwest::Client,
}

impl RpcNodeClient {
    pub fn new(name: impl Into<String>, config: &NodeConfig) -> Result<Self, XvgError> {
        Ok(Self {
            name: name.into(),
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            confirmation_limit: config.confirmation_limit,
            utxo_proxy_url: config
                .utxo_proxy_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
            http: build_http_client(config)?,
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, XvgError> {
        self.send_call(method, params).await.map_err(|e| {
            if matches!(e, XvgError::Network { .. }) {
                warn!(node = %self.name, method, error = %e, "rpc request failed");
            }
            e
        })
    }

    async fn send_call(&self, method: &str, params: Value) -> Result<Value, XvgError> {
        debug!(node = %self.name, method, "rpc call");
        let request = RpcRequest {
            jsonrpc: "1.0",
            id: "xvg-wallet",
            method,
            params,
        };
        let mut builder = self.http.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&self.url, e))?;
        let (status, mut body) = read_json(&self.url, response).await?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            if error.get("code").and_then(Value::as_i64) == Some(RPC_NOT_FOUND) {
                return Err(XvgError::NotFound(message));
            }
            return Err(XvgError::Network {
                endpoint: self.url.clone(),
                status: Some(status.as_u16()),
                message: format!("RPC {method} failed: {message}"),
            });
        }
        if !status.is_success() {
            return Err(status_error(&self.url, status, None));
        }
        Ok(body.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    async fn list_unspent(&self, address: &str) -> Result<Vec<Value>, XvgError> {
        let result = self
            .call("listunspent", json!([0, 9_999_999, [address]]))
            .await?;
        match result {
            Value::Array(entries) => Ok(entries),
            _ => Err(malformed(&self.url, "listunspent result is not an array")),
        }
    }

    async fn proxy_utxos(&self, proxy: &str, address: &str) -> Result<Vec<Utxo>, XvgError> {
        let endpoint = format!("{proxy}/utxo");
        let response = self
            .http
            .get(&endpoint)
            .query(&[("network", PROXY_NETWORK), ("address", address)])
            .send()
            .await
            .map_err(|e| transport_error(&endpoint, e))?;
        let (status, body) = read_json(&endpoint, response).await?;
        if !status.is_success() {
            return Err(status_error(&endpoint, status, None));
        }
        let parsed: ProxyUtxos = serde_json::from_value(body)
            .map_err(|e| malformed(&endpoint, &format!("utxo list: {e}")))?;
        Ok(parsed.utxos)
    }

    fn process_block(&self, raw: &Value) -> Result<BlockInfo, XvgError> {
        let height = raw["height"]
            .as_u64()
            .ok_or_else(|| malformed(&self.url, "block height"))?;
        let timestamp = raw["time"]
            .as_u64()
            .ok_or_else(|| malformed(&self.url, "block time"))?;
        let transactions = raw["tx"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|tx| match tx.as_str() {
                // Verbosity 1 lists bare txids.
                Some(txid) => Ok(TransactionDetail {
                    hash: txid.to_string(),
                    ticker: TICKER.to_string(),
                    from: Vec::new(),
                    to: Vec::new(),
                    status: TxStatus::Unknown,
                    height: Some(height),
                    timestamp: Some(timestamp),
                    confirmations: 0,
                }),
                None => self.process_transaction(tx).map(|mut detail| {
                    detail.height.get_or_insert(height);
                    detail.timestamp.get_or_insert(timestamp);
                    detail
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BlockInfo {
            height,
            timestamp,
            transactions,
        })
    }

    fn process_transaction(&self, raw: &Value) -> Result<TransactionDetail, XvgError> {
        let hash = raw["txid"]
            .as_str()
            .or_else(|| raw["hash"].as_str())
            .ok_or_else(|| malformed(&self.url, "transaction id"))?;

        let mut from = Vec::new();
        for input in raw["vin"].as_array().map(Vec::as_slice).unwrap_or_default() {
            let address = input["address"].as_str().unwrap_or("coinbase");
            from.push(TxInput::new(address, optional_amount(&input["value"])?));
        }

        let mut to = Vec::new();
        for output in raw["vout"].as_array().map(Vec::as_slice).unwrap_or_default() {
            let script = &output["scriptPubKey"];
            let address = script["addresses"][0]
                .as_str()
                .or_else(|| script["address"].as_str())
                .unwrap_or_default();
            to.push(TxOutput::new(address, optional_amount(&output["value"])?));
        }

        let confirmations = raw["confirmations"].as_u64().unwrap_or(0);
        Ok(TransactionDetail {
            hash: hash.to_string(),
            ticker: TICKER.to_string(),
            from,
            to,
            status: TxStatus::from_confirmations(confirmations, self.confirmation_limit),
            height: raw["blockheight"].as_u64(),
            timestamp: raw["blocktime"].as_u64(),
            confirmations,
        })
    }
}

#[async_trait]
impl NodeClient for RpcNodeClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_height(&self) -> Result<u64, XvgError> {
        self.call("getblockcount", json!([]))
            .await?
            .as_u64()
            .ok_or_else(|| malformed(&self.url, "getblockcount result"))
    }

    async fn get_block(&self, id: BlockId) -> Result<BlockInfo, XvgError> {
        let hash = match id {
            BlockId::Hash(hash) => hash,
            BlockId::Height(height) => self
                .call("getblockhash", json!([height]))
                .await?
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed(&self.url, "getblockhash result"))?,
        };
        let raw = self.call("getblock", json!([hash, 2])).await?;
        self.process_block(&raw)
    }

    async fn balance_by_address(&self, address: &str) -> Result<Balance, XvgError> {
        let amounts = self
            .list_unspent(address)
            .await?
            .iter()
            .map(|entry| optional_amount(&entry["amount"]))
            .collect::<Result<Vec<_>, _>>()?;
        let total = checked_sum(&amounts)?;
        Ok(Balance {
            balance: total,
            total_balance: total,
        })
    }

    async fn tx_by_hash(&self, hash: &str) -> Result<TransactionDetail, XvgError> {
        let raw = self.call("getrawtransaction", json!([hash, true])).await?;
        if raw.is_null() {
            return Err(XvgError::NotFound(format!("transaction {hash}")));
        }
        self.process_transaction(&raw)
    }

    async fn utxo_by_address(&self, address: &str) -> Result<Vec<Utxo>, XvgError> {
        let mut utxos = match &self.utxo_proxy_url {
            Some(proxy) => self.proxy_utxos(proxy, address).await?,
            None => self
                .list_unspent(address)
                .await?
                .iter()
                .map(|entry| {
                    Ok(Utxo {
                        txid: entry["txid"]
                            .as_str()
                            .ok_or_else(|| malformed(&self.url, "utxo txid"))?
                            .to_string(),
                        vout: entry["vout"]
                            .as_u64()
                            .and_then(|v| u32::try_from(v).ok())
                            .ok_or_else(|| malformed(&self.url, "utxo vout"))?,
                        value: optional_amount(&entry["amount"])?,
                        confirmations: entry["confirmations"].as_u64().unwrap_or(0),
                        address: entry["address"].as_str().unwrap_or_default().to_string(),
                    })
                })
                .collect::<Result<Vec<_>, XvgError>>()?,
        };
        for utxo in utxos.iter_mut().filter(|u| u.address.is_empty()) {
            utxo.address = address.to_string();
        }
        debug!(node = %self.name, address, count = utxos.len(), "fetched utxos");
        Ok(utxos)
    }

    async fn tx_broadcast(&self, signed: &SignedTx) -> Result<BroadcastResult, XvgError> {
        let payload = signed.broadcast_payload();
        match self.call("sendrawtransaction", json!([payload])).await {
            Ok(Value::String(hash)) => {
                info!(node = %self.name, %hash, "transaction broadcast");
                Ok(BroadcastResult::Accepted { hash })
            }
            Ok(other) => Ok(BroadcastResult::Rejected {
                error: format!("Error broadcasting transaction: unexpected result {other}"),
            }),
            Err(e) => {
                warn!(node = %self.name, error = %e, "broadcast rejected");
                Ok(BroadcastResult::Rejected {
                    error: format!("Error broadcasting transaction: {e}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::http::log_capture::CapturedLogs;
    use httpmock::prelude::*;
    use rust_decimal::Decimal;

    fn client_for(server: &MockServer) -> RpcNodeClient {
        let config = NodeConfig::rpc(server.base_url()).with_api_key("test-key");
        RpcNodeClient::new("nowNodes", &config).unwrap()
    }

    fn signed() -> SignedTx {
        SignedTx {
            signed_data: vec!["3044".into()],
            tx_hash: "00".repeat(32),
        }
    }

    #[tokio::test]
    async fn get_height_sends_api_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header("api-key", "test-key")
                    .json_body_partial(r#"{"jsonrpc":"1.0","method":"getblockcount"}"#);
                then.status(200)
                    .json_body(json!({"result": 123456, "error": null, "id": "xvg-wallet"}));
            })
            .await;

        let height = client_for(&server).get_height().await.unwrap();
        assert_eq!(height, 123456);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_block_by_height_resolves_hash_first() {
        let server = MockServer::start_async().await;
        let hash_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .json_body_partial(r#"{"method":"getblockhash","params":[42]}"#);
                then.status(200).json_body(json!({"result": "blockhash42"}));
            })
            .await;
        let block_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .json_body_partial(r#"{"method":"getblock","params":["blockhash42",2]}"#);
                then.status(200).json_body(json!({"result": {
                    "height": 42,
                    "time": 1700000000,
                    "tx": [{
                        "txid": "cb",
                        "vin": [{"coinbase": "03ab"}],
                        "vout": [{"value": 50.5, "scriptPubKey": {"addresses": ["DMiner"]}}]
                    }]
                }}));
            })
            .await;

        let block = client_for(&server).get_block(BlockId::Height(42)).await.unwrap();
        hash_mock.assert_async().await;
        block_mock.assert_async().await;

        assert_eq!(block.height, 42);
        assert_eq!(block.timestamp, 1_700_000_000);
        let tx = &block.transactions[0];
        assert_eq!(tx.from[0].address, "coinbase");
        assert_eq!(tx.from[0].value, Decimal::ZERO);
        assert_eq!(tx.to[0].address, "DMiner");
        assert_eq!(tx.to[0].value, Decimal::new(505, 1));
        assert_eq!(tx.height, Some(42));
        assert_eq!(tx.status, TxStatus::Unknown);
    }

    #[tokio::test]
    async fn balance_sums_listunspent_exactly() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .json_body_partial(r#"{"method":"listunspent","params":[0,9999999,["DAddr"]]}"#);
                then.status(200).json_body(json!({"result": [
                    {"txid": "a", "vout": 0, "amount": 0.1},
                    {"txid": "b", "vout": 1, "amount": 0.2}
                ]}));
            })
            .await;

        let balance = client_for(&server).balance_by_address("DAddr").await.unwrap();
        assert_eq!(balance.balance, Decimal::new(3, 1));
        assert_eq!(balance.total_balance, balance.balance);
    }

    #[tokio::test]
    async fn tx_by_hash_maps_status_from_confirmations() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .json_body_partial(r#"{"method":"getrawtransaction","params":["t1",true]}"#);
                then.status(200).json_body(json!({"result": {
                    "txid": "t1",
                    "confirmations": 12,
                    "blockheight": 900,
                    "blocktime": 1700000100,
                    "vin": [{"address": "DFrom", "value": "1.5"}],
                    "vout": [
                        {"value": "1.0", "scriptPubKey": {"addresses": ["DTo"]}},
                        {"value": "0.4", "scriptPubKey": {}}
                    ]
                }}));
            })
            .await;

        let tx = client_for(&server).tx_by_hash("t1").await.unwrap();
        assert_eq!(tx.hash, "t1");
        assert_eq!(tx.ticker, "XVG");
        assert_eq!(tx.status, TxStatus::Finished);
        assert_eq!(tx.height, Some(900));
        assert_eq!(tx.timestamp, Some(1_700_000_100));
        assert_eq!(tx.from, vec![TxInput::new("DFrom", Decimal::new(15, 1))]);
        assert_eq!(tx.to[1].address, "");
    }

    #[tokio::test]
    async fn tx_by_hash_null_result_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({"result": null, "error": null}));
            })
            .await;

        let err = client_for(&server).tx_by_hash("missing").await.unwrap_err();
        assert!(matches!(err, XvgError::NotFound(_)));
    }

    #[tokio::test]
    async fn rpc_not_found_code_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(500).json_body(json!({
                    "result": null,
                    "error": {"code": -5, "message": "No such mempool or blockchain transaction"}
                }));
            })
            .await;

        let err = client_for(&server).tx_by_hash("missing").await.unwrap_err();
        assert!(matches!(err, XvgError::NotFound(msg) if msg.contains("No such")));
    }

    #[tokio::test]
    async fn http_failure_becomes_network_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("maintenance");
            })
            .await;

        let logs = CapturedLogs::default();
        let _guard = logs.install();
        let err = client_for(&server).get_height().await.unwrap_err();
        assert!(logs.contents().contains("rpc request failed"));
        assert!(logs.contents().contains("getblockcount"));
        match err {
            XvgError::Network {
                endpoint, status, ..
            } => {
                assert_eq!(endpoint, server.base_url());
                assert_eq!(status, Some(503));
            }
            other => panic!("expected Network, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn utxos_from_listunspent_default_address() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).json_body_partial(r#"{"method":"listunspent"}"#);
                then.status(200).json_body(json!({"result": [
                    {"txid": "t1", "vout": 0, "amount": 1.5, "confirmations": 3}
                ]}));
            })
            .await;

        let utxos = client_for(&server).utxo_by_address("DAddr").await.unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].reference().to_string(), "t1|0");
        assert_eq!(utxos[0].value, Decimal::new(15, 1));
        assert_eq!(utxos[0].address, "DAddr");
    }

    #[tokio::test]
    async fn utxos_from_proxy_when_configured() {
        let node = MockServer::start_async().await;
        let proxy = MockServer::start_async().await;
        let proxy_mock = proxy
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/utxo")
                    .query_param("network", "xvg")
                    .query_param("address", "DAddr");
                then.status(200).json_body(json!({"utxos": [
                    {"txid": "p1", "vout": 2, "value": "0.75", "confirmations": 11}
                ]}));
            })
            .await;

        let config = NodeConfig::rpc(node.base_url()).with_utxo_proxy(proxy.base_url());
        let client = RpcNodeClient::new("nowNodes", &config).unwrap();
        let utxos = client.utxo_by_address("DAddr").await.unwrap();

        proxy_mock.assert_async().await;
        assert_eq!(utxos[0].reference().to_string(), "p1|2");
        assert_eq!(utxos[0].value, Decimal::new(75, 2));
        assert_eq!(utxos[0].address, "DAddr");
    }

    #[tokio::test]
    async fn broadcast_success_returns_hash() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .json_body_partial(r#"{"method":"sendrawtransaction","params":["[\"3044\"]"]}"#);
                then.status(200).json_body(json!({"result": "txhash1"}));
            })
            .await;

        let result = client_for(&server).tx_broadcast(&signed()).await.unwrap();
        assert_eq!(
            result,
            BroadcastResult::Accepted {
                hash: "txhash1".into()
            }
        );
    }

    #[tokio::test]
    async fn broadcast_failure_is_a_value() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(500).json_body(json!({
                    "result": null,
                    "error": {"code": -26, "message": "bad-txns"}
                }));
            })
            .await;

        match client_for(&server).tx_broadcast(&signed()).await.unwrap() {
            BroadcastResult::Rejected { error } => {
                assert!(error.starts_with("Error broadcasting transaction"));
                assert!(error.contains("bad-txns"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
