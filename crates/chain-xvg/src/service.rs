//! Verge coin service: the entry point the wallet framework talks to.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::address::{pubkey_to_address, validate_address, AddressValidity};
use crate::amount::DEFAULT_NETWORK_FEE;
use crate::builder::build_transaction;
use crate::client::{
    self, Balance, BlockId, BlockInfo, BroadcastResult, NodeClient, TransactionDetail,
};
use crate::config::XvgConfig;
use crate::error::XvgError;
use crate::keys::generate_keypair;
use crate::network::{ensure_ticker, XvgNetwork};
use crate::signer::sign_transaction;
use crate::types::{BuildRequest, BuildResult, SignedTx, UtxoRef};
use crate::utxo::{select_largest_first, UtxoSelection};

/// Freshly generated address with its keys, hex encoded.
///
/// The caller owns storage of the private key; nothing here persists it.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAddress {
    pub address: String,
    pub private_key: String,
    pub public_key: String,
}

impl fmt::Debug for CreatedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedAddress")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

pub struct XvgCoinService {
    network: XvgNetwork,
    default_network_fee: Decimal,
    nodes: Vec<Arc<dyn NodeClient>>,
}

impl XvgCoinService {
    /// Service without any node; only the offline operations work until a
    /// node is added.
    pub fn new(network: XvgNetwork) -> Self {
        Self {
            network,
            default_network_fee: DEFAULT_NETWORK_FEE,
            nodes: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: Arc<dyn NodeClient>) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_default_network_fee(mut self, fee: Decimal) -> Self {
        self.default_network_fee = fee;
        self
    }

    pub fn from_config(config: &XvgConfig) -> Result<Self, XvgError> {
        config.validate()?;
        let mut service =
            Self::new(config.network).with_default_network_fee(config.default_network_fee);
        for (name, node) in config.nodes.iter() {
            service.nodes.push(client::connect(name, node)?);
        }
        info!(
            network = %config.network,
            nodes = ?config.nodes.names(),
            "xvg service initialized"
        );
        Ok(service)
    }

    /// Stock NowNodes configuration for `network`.
    pub fn create_default(network: XvgNetwork) -> Result<Self, XvgError> {
        Self::from_config(&XvgConfig::default_for(network))
    }

    pub fn network(&self) -> XvgNetwork {
        self.network
    }

    pub fn nodes(&self) -> &[Arc<dyn NodeClient>] {
        &self.nodes
    }

    fn primary_node(&self) -> Result<&dyn NodeClient, XvgError> {
        self.nodes
            .first()
            .map(|n| n.as_ref())
            .ok_or(XvgError::NoNodeConfigured)
    }

    pub fn address_create(&self, ticker: &str) -> Result<CreatedAddress, XvgError> {
        ensure_ticker(ticker)?;
        let pair = generate_keypair();
        let address = pubkey_to_address(pair.public_key(), self.network)?;
        Ok(CreatedAddress {
            address,
            private_key: pair.private_key_hex().to_string(),
            public_key: pair.public_key_hex(),
        })
    }

    /// Never fails: an unsupported ticker is reported as a reason too.
    pub fn address_validate(
        &self,
        ticker: &str,
        address: &str,
        private_key_hex: &str,
        public_key_hex: &str,
    ) -> AddressValidity {
        validate_address(ticker, address, private_key_hex, public_key_hex, self.network)
    }

    /// Build against the first configured node. A request without a network
    /// fee gets this service's default.
    pub async fn tx_build(
        &self,
        ticker: &str,
        request: &BuildRequest,
    ) -> Result<BuildResult, XvgError> {
        ensure_ticker(ticker)?;
        let node = self.primary_node()?;
        let needs_fee = request
            .fee
            .as_ref()
            .map_or(true, |fee| fee.network_fee.is_none());
        if needs_fee {
            let request = request.clone().with_network_fee(self.default_network_fee);
            build_transaction(node, ticker, &request).await
        } else {
            build_transaction(node, ticker, request).await
        }
    }

    /// Pick the UTXOs of `address` that actually fund `target`, skipping
    /// `spent`. Largest first; see [`select_largest_first`].
    pub async fn select_utxos(
        &self,
        ticker: &str,
        address: &str,
        spent: &[UtxoRef],
        target: Decimal,
    ) -> Result<UtxoSelection, XvgError> {
        ensure_ticker(ticker)?;
        let utxos = self.primary_node()?.utxo_by_address(address).await?;
        select_largest_first(&utxos, spent, target)
    }

    pub fn tx_sign(
        &self,
        ticker: &str,
        private_keys: &HashMap<String, String>,
        params: &serde_json::Value,
    ) -> Result<SignedTx, XvgError> {
        sign_transaction(ticker, private_keys, params)
    }

    pub async fn tx_broadcast(
        &self,
        ticker: &str,
        signed: &SignedTx,
    ) -> Result<BroadcastResult, XvgError> {
        ensure_ticker(ticker)?;
        self.primary_node()?.tx_broadcast(signed).await
    }

    pub async fn get_height(&self) -> Result<u64, XvgError> {
        self.primary_node()?.get_height().await
    }

    pub async fn get_block(&self, id: BlockId) -> Result<BlockInfo, XvgError> {
        self.primary_node()?.get_block(id).await
    }

    pub async fn balance_by_address(
        &self,
        ticker: &str,
        address: &str,
    ) -> Result<Balance, XvgError> {
        ensure_ticker(ticker)?;
        self.primary_node()?.balance_by_address(address).await
    }

    pub async fn tx_by_hash(
        &self,
        ticker: &str,
        hash: &str,
    ) -> Result<TransactionDetail, XvgError> {
        ensure_ticker(ticker)?;
        self.primary_node()?.tx_by_hash(hash).await
    }
}

impl fmt::Debug for XvgCoinService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.nodes.iter().map(|n| n.name()).collect();
        f.debug_struct("XvgCoinService")
            .field("network", &self.network)
            .field("default_network_fee", &self.default_network_fee)
            .field("nodes", &names)
            .finish()
    }
}
