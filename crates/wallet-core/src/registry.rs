use std::collections::HashMap;
use std::sync::Arc;

use chain_xvg::XvgCoinService;
use serde_json::Value;
use tracing::{debug, info};

use crate::coin::CoinService;
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::types::{AddressCheck, GeneratedAddress, SignedPayload};

/// Routes framework calls to the coin service registered for a ticker.
#[derive(Default, Clone)]
pub struct CoinRegistry {
    services: HashMap<String, Arc<dyn CoinService>>,
}

impl CoinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every coin whose section is present in `config`.
    pub fn from_config(config: &WalletConfig) -> Result<Self, WalletError> {
        let mut registry = Self::new();
        if let Some(xvg) = &config.xvg {
            registry.register(Arc::new(XvgCoinService::from_config(xvg)?));
        }
        info!(coins = ?registry.tickers(), "coin registry ready");
        Ok(registry)
    }

    /// Replaces any service already registered for the same ticker.
    pub fn register(&mut self, service: Arc<dyn CoinService>) {
        let ticker = service.coin().ticker().to_string();
        debug!(%ticker, "registering coin service");
        self.services.insert(ticker, service);
    }

    pub fn get(&self, ticker: &str) -> Result<Arc<dyn CoinService>, WalletError> {
        self.services
            .get(ticker)
            .cloned()
            .ok_or_else(|| WalletError::UnsupportedChain(ticker.to_string()))
    }

    /// Sorted tickers of registered coins.
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.services.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    pub fn address_create(&self, ticker: &str) -> Result<GeneratedAddress, WalletError> {
        self.get(ticker)?.address_create(ticker)
    }

    /// An unknown ticker is reported as a reason, like every other problem.
    pub fn address_validate(
        &self,
        ticker: &str,
        address: &str,
        private_key: &str,
        public_key: &str,
    ) -> AddressCheck {
        match self.get(ticker) {
            Ok(service) => service.address_validate(ticker, address, private_key, public_key),
            Err(_) => AddressCheck::Invalid(format!("Unsupported ticker: {ticker}")),
        }
    }

    pub async fn tx_build(&self, ticker: &str, params: Value) -> Result<Value, WalletError> {
        self.get(ticker)?.tx_build(ticker, params).await
    }

    pub fn tx_sign(
        &self,
        ticker: &str,
        private_keys: &HashMap<String, String>,
        params: &Value,
    ) -> Result<SignedPayload, WalletError> {
        self.get(ticker)?.tx_sign(ticker, private_keys, params)
    }

    pub async fn tx_broadcast(
        &self,
        ticker: &str,
        signed: &SignedPayload,
    ) -> Result<Value, WalletError> {
        self.get(ticker)?.tx_broadcast(ticker, signed).await
    }

    pub async fn balance_by_address(
        &self,
        ticker: &str,
        address: &str,
    ) -> Result<Value, WalletError> {
        self.get(ticker)?.balance_by_address(ticker, address).await
    }

    pub async fn tx_by_hash(&self, ticker: &str, hash: &str) -> Result<Value, WalletError> {
        self.get(ticker)?.tx_by_hash(ticker, hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_xvg::XvgNetwork;
    use serde_json::json;

    fn offline_registry() -> CoinRegistry {
        let mut registry = CoinRegistry::new();
        registry.register(Arc::new(XvgCoinService::new(XvgNetwork::Mainnet)));
        registry
    }

    #[test]
    fn register_and_lookup() {
        let registry = offline_registry();
        assert_eq!(registry.tickers(), vec!["XVG"]);
        assert!(registry.get("XVG").is_ok());
        assert!(matches!(
            registry.get("BTC"),
            Err(WalletError::UnsupportedChain(t)) if t == "BTC"
        ));
    }

    #[test]
    fn create_then_validate_through_registry() {
        let registry = offline_registry();
        let generated = registry.address_create("XVG").unwrap();
        let check = registry.address_validate(
            "XVG",
            &generated.address,
            &generated.private_key,
            &generated.public_key,
        );
        assert!(check.is_valid());
    }

    #[test]
    fn validate_unknown_ticker_is_a_reason() {
        let registry = offline_registry();
        assert_eq!(
            registry.address_validate("ETH", "0xabc", "aa", "bb"),
            AddressCheck::Invalid("Unsupported ticker: ETH".into())
        );
    }

    #[test]
    fn sign_rejects_extra_fields_through_registry() {
        let registry = offline_registry();
        let params = json!({
            "from": [{"address": "A", "value": "1"}],
            "to": [{"address": "B", "value": "1"}],
            "memo": "x"
        });
        let err = registry.tx_sign("XVG", &HashMap::new(), &params).unwrap_err();
        assert!(matches!(err, WalletError::UnexpectedFields(f) if f == ["memo"]));
    }

    #[tokio::test]
    async fn build_without_node_is_config_error() {
        let registry = offline_registry();
        let params = json!({
            "from": {"address": "A", "value": "1"},
            "to": {"address": "B", "value": "1"}
        });
        let err = registry.tx_build("XVG", params).await.unwrap_err();
        assert!(matches!(err, WalletError::Config(_)));
    }

    #[tokio::test]
    async fn build_rejects_malformed_request() {
        let registry = offline_registry();
        let err = registry
            .tx_build("XVG", json!({"from": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidParams(_)));
    }

    #[test]
    fn from_config_skips_absent_sections() {
        let registry = CoinRegistry::from_config(&WalletConfig::default()).unwrap();
        assert!(registry.tickers().is_empty());

        let config = WalletConfig::from_json_str(
            r#"{"xvg": {"nodes": {"nowNodes": {"url": "https://xvg.nownodes.io"}}}}"#,
        )
        .unwrap();
        let registry = CoinRegistry::from_config(&config).unwrap();
        assert_eq!(registry.tickers(), vec!["XVG"]);
    }
}
