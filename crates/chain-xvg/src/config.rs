//! Explicit node and fee configuration.
//!
//! Everything a node adapter needs (endpoint, API key, timeouts, UTXO proxy)
//! is passed in here at construction time. Nothing in this crate reads the
//! process environment.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::amount::{serde_amount, DEFAULT_NETWORK_FEE};
use crate::error::XvgError;
use crate::network::XvgNetwork;

/// Confirmations after which a transaction counts as finished.
pub const DEFAULT_CONFIRMATION_LIMIT: u64 = 10;

/// Per-request timeout applied by every adapter.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Provider name used by the stock configuration.
pub const DEFAULT_NODE_NAME: &str = "nowNodes";

/// Which wire protocol a node speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Bitcoin-style JSON-RPC (`getblockcount`, `listunspent`, ...).
    #[default]
    Rpc,
    /// Blockbook REST indexer.
    Blockbook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default)]
    pub kind: NodeKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_confirmation_limit")]
    pub confirmation_limit: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `GET {proxy}/utxo?network=xvg&address=..` source for RPC nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utxo_proxy_url: Option<String>,
    /// Blockbook API version segment (`/api/{version}`).
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_confirmation_limit() -> u64 {
    DEFAULT_CONFIRMATION_LIMIT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_api_version() -> String {
    "v2".to_string()
}

impl NodeConfig {
    pub fn rpc(url: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Rpc,
            url: url.into(),
            api_key: None,
            confirmation_limit: DEFAULT_CONFIRMATION_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            utxo_proxy_url: None,
            api_version: default_api_version(),
        }
    }

    pub fn blockbook(url: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Blockbook,
            ..Self::rpc(url)
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_utxo_proxy(mut self, url: impl Into<String>) -> Self {
        self.utxo_proxy_url = Some(url.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), XvgError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(XvgError::Config(format!(
                "node url must be http(s), got '{}'",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(XvgError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

/// Named node settings in the order they were configured.
///
/// Serialized as a JSON object. The first entry is the node that serves
/// builds and broadcasts, so document order is kept rather than sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMap(Vec<(String, NodeConfig)>);

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the settings of an existing name in place; new names go last.
    pub fn insert(&mut self, name: impl Into<String>, node: NodeConfig) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = node,
            None => self.0.push((name, node)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&NodeConfig> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeConfig)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Serialize for NodeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, node) in &self.0 {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NodeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeMapVisitor;

        impl<'de> Visitor<'de> for NodeMapVisitor {
            type Value = NodeMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of node name to node settings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<NodeMap, A::Error> {
                let mut nodes = NodeMap::new();
                while let Some((name, node)) = access.next_entry::<String, NodeConfig>()? {
                    nodes.insert(name, node);
                }
                Ok(nodes)
            }
        }

        deserializer.deserialize_map(NodeMapVisitor)
    }
}

/// Configuration for one Verge service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XvgConfig {
    #[serde(default)]
    pub network: XvgNetwork,
    #[serde(default = "default_network_fee", with = "serde_amount")]
    pub default_network_fee: Decimal,
    /// Provider name -> settings. The first entry serves builds.
    #[serde(default)]
    pub nodes: NodeMap,
}

fn default_network_fee() -> Decimal {
    DEFAULT_NETWORK_FEE
}

impl XvgConfig {
    /// Stock NowNodes setup for `network`, without an API key.
    pub fn default_for(network: XvgNetwork) -> Self {
        let mut nodes = NodeMap::new();
        nodes.insert(DEFAULT_NODE_NAME, NodeConfig::rpc(network.default_rpc_url()));
        Self {
            network,
            default_network_fee: DEFAULT_NETWORK_FEE,
            nodes,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, XvgError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| XvgError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), XvgError> {
        for (name, node) in self.nodes.iter() {
            node.validate().map_err(|e| match e {
                XvgError::Config(message) => XvgError::Config(format!("node '{name}': {message}")),
                other => other,
            })?;
        }
        Ok(())
    }
}
