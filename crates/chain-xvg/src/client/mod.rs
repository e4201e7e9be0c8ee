//! Node access contract and its HTTP adapters.
//!
//! The builder and service depend only on [`NodeClient`]; concrete adapters
//! ([`RpcNodeClient`], [`BlockbookClient`]) are picked by configuration.

mod blockbook;
mod http;
mod rpc;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::serde_amount;
use crate::config::{NodeConfig, NodeKind};
use crate::error::XvgError;
use crate::types::{SignedTx, TxInput, TxOutput, Utxo};

pub use blockbook::BlockbookClient;
pub use rpc::RpcNodeClient;

/// Block lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Height(u64),
    Hash(String),
}

impl From<u64> for BlockId {
    fn from(height: u64) -> Self {
        BlockId::Height(height)
    }
}

impl From<&str> for BlockId {
    fn from(hash: &str) -> Self {
        BlockId::Hash(hash.to_string())
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockId::Height(h) => write!(f, "{h}"),
            BlockId::Hash(hash) => f.write_str(hash),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Finished,
    Unknown,
}

impl TxStatus {
    pub fn from_confirmations(confirmations: u64, limit: u64) -> Self {
        if confirmations >= limit {
            TxStatus::Finished
        } else {
            TxStatus::Unknown
        }
    }
}

/// Normalized transaction as reported by a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub hash: String,
    pub ticker: String,
    pub from: Vec<TxInput>,
    pub to: Vec<TxOutput>,
    pub status: TxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub confirmations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    /// Unix seconds.
    pub timestamp: u64,
    pub transactions: Vec<TransactionDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(with = "serde_amount")]
    pub balance: Decimal,
    /// Confirmed plus unconfirmed.
    #[serde(with = "serde_amount")]
    pub total_balance: Decimal,
}

/// Broadcast outcome. A rejected broadcast is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BroadcastResult {
    Accepted { hash: String },
    Rejected { error: String },
}

impl BroadcastResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BroadcastResult::Accepted { .. })
    }
}

/// Capability interface for reading chain state and submitting transactions.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    async fn get_height(&self) -> Result<u64, XvgError>;

    async fn get_block(&self, id: BlockId) -> Result<BlockInfo, XvgError>;

    async fn balance_by_address(&self, address: &str) -> Result<Balance, XvgError>;

    /// Fails with [`XvgError::NotFound`] when the node does not know `hash`.
    async fn tx_by_hash(&self, hash: &str) -> Result<TransactionDetail, XvgError>;

    async fn utxo_by_address(&self, address: &str) -> Result<Vec<Utxo>, XvgError>;

    async fn tx_broadcast(&self, signed: &SignedTx) -> Result<BroadcastResult, XvgError>;
}

/// Build the adapter matching `config.kind`.
pub fn connect(name: &str, config: &NodeConfig) -> Result<Arc<dyn NodeClient>, XvgError> {
    config.validate()?;
    let client: Arc<dyn NodeClient> = match config.kind {
        NodeKind::Rpc => Arc::new(RpcNodeClient::new(name, config)?),
        NodeKind::Blockbook => Arc::new(BlockbookClient::new(name, config)?),
    };
    Ok(client)
}
