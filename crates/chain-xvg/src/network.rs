use serde::{Deserialize, Serialize};

/// Ticker this crate answers to. Every public entry point rejects others.
pub const TICKER: &str = "XVG";

/// Default NowNodes endpoint for Verge mainnet.
pub const MAINNET_RPC: &str = "https://xvg.nownodes.io";

/// Default NowNodes endpoint for Verge testnet.
pub const TESTNET_RPC: &str = "https://xvg-testnet.nownodes.io";

/// Supported Verge networks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XvgNetwork {
    #[default]
    Mainnet,
    Testnet,
}

impl XvgNetwork {
    /// P2PKH version byte. Mainnet 0x1E renders as a leading `D`.
    pub fn pubkey_address_version(self) -> u8 {
        match self {
            XvgNetwork::Mainnet => 0x1E,
            XvgNetwork::Testnet => 0x73,
        }
    }

    /// Return the default node endpoint for this network.
    pub fn default_rpc_url(self) -> &'static str {
        match self {
            XvgNetwork::Mainnet => MAINNET_RPC,
            XvgNetwork::Testnet => TESTNET_RPC,
        }
    }
}

/// Reject any ticker other than [`TICKER`].
pub fn ensure_ticker(ticker: &str) -> Result<(), crate::error::XvgError> {
    if ticker == TICKER {
        Ok(())
    } else {
        Err(crate::error::XvgError::UnsupportedTicker(ticker.to_string()))
    }
}

impl std::fmt::Display for XvgNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XvgNetwork::Mainnet => write!(f, "mainnet"),
            XvgNetwork::Testnet => write!(f, "testnet"),
        }
    }
}
