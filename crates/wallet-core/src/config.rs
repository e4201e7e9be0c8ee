use std::path::Path;

use chain_xvg::XvgConfig;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::logging::LoggingConfig;

/// Top-level wallet configuration, loaded from JSON.
///
/// A coin section that is absent leaves that coin unregistered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xvg: Option<XvgConfig>,
}

impl WalletConfig {
    pub fn from_json_str(json: &str) -> Result<Self, WalletError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| WalletError::Config(format!("invalid wallet config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        self.logging.filter()?;
        if let Some(xvg) = &self.xvg {
            xvg.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use chain_xvg::XvgNetwork;

    #[test]
    fn empty_config_has_no_coins() {
        let config = WalletConfig::from_json_str("{}").unwrap();
        assert!(config.xvg.is_none());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parses_xvg_section() {
        let config = WalletConfig::from_json_str(
            r#"{
                "logging": {"level": "debug", "format": "json"},
                "xvg": {
                    "network": "testnet",
                    "nodes": {"nowNodes": {"url": "https://xvg-testnet.nownodes.io", "apiKey": "k"}}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        let xvg = config.xvg.unwrap();
        assert_eq!(xvg.network, XvgNetwork::Testnet);
        assert_eq!(xvg.nodes.get("nowNodes").unwrap().api_key.as_deref(), Some("k"));
    }

    #[test]
    fn invalid_node_url_is_config_error() {
        let err = WalletConfig::from_json_str(r#"{"xvg": {"nodes": {"n": {"url": "nope"}}}}"#)
            .unwrap_err();
        assert!(matches!(err, WalletError::Config(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = WalletConfig::from_file("/nonexistent/wallet.json").unwrap_err();
        assert!(matches!(err, WalletError::Config(msg) if msg.contains("/nonexistent/wallet.json")));
    }

    #[test]
    fn reads_from_file() {
        let path = std::env::temp_dir().join(format!("wallet-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"logging": {"level": "warn"}}"#).unwrap();
        let config = WalletConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.logging.level, "warn");
    }
}
