use std::fmt;

use serde::{Deserialize, Serialize};

/// Coins the framework can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coin {
    Verge,
}

impl Coin {
    pub const ALL: [Coin; 1] = [Coin::Verge];

    /// Ticker used to route framework calls.
    pub fn ticker(&self) -> &'static str {
        match self {
            Coin::Verge => chain_xvg::TICKER,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

/// Generated address plus its hex keys. The caller stores the private key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAddress {
    pub address: String,
    pub private_key: String,
    pub public_key: String,
}

impl fmt::Debug for GeneratedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedAddress")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Address validation outcome. Serializes as `true` or the reason string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressCheck {
    Valid,
    Invalid(String),
}

impl AddressCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, AddressCheck::Valid)
    }
}

impl Serialize for AddressCheck {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AddressCheck::Valid => serializer.serialize_bool(true),
            AddressCheck::Invalid(reason) => serializer.serialize_str(reason),
        }
    }
}

/// Signatures and transaction hash, as handed to broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
    pub signed_data: Vec<String>,
    pub tx_hash: String,
}
