//! Chain-agnostic coin service contract.
//!
//! Build and sign exchange untyped JSON so the framework can pass through
//! whatever the caller sent; each coin does its own schema checks.

use std::collections::HashMap;

use async_trait::async_trait;
use chain_xvg::address::AddressValidity;
use chain_xvg::types::{BuildRequest, SignedTx};
use chain_xvg::XvgCoinService;
use serde_json::Value;

use crate::error::WalletError;
use crate::types::{AddressCheck, Coin, GeneratedAddress, SignedPayload};

#[async_trait]
pub trait CoinService: Send + Sync {
    fn coin(&self) -> Coin;

    fn address_create(&self, ticker: &str) -> Result<GeneratedAddress, WalletError>;

    /// Never fails; problems come back as [`AddressCheck::Invalid`].
    fn address_validate(
        &self,
        ticker: &str,
        address: &str,
        private_key: &str,
        public_key: &str,
    ) -> AddressCheck;

    async fn tx_build(&self, ticker: &str, params: Value) -> Result<Value, WalletError>;

    fn tx_sign(
        &self,
        ticker: &str,
        private_keys: &HashMap<String, String>,
        params: &Value,
    ) -> Result<SignedPayload, WalletError>;

    /// `{"hash": ..}` on success, `{"error": ..}` when the node refused it.
    async fn tx_broadcast(&self, ticker: &str, signed: &SignedPayload)
        -> Result<Value, WalletError>;

    async fn balance_by_address(&self, ticker: &str, address: &str) -> Result<Value, WalletError>;

    async fn tx_by_hash(&self, ticker: &str, hash: &str) -> Result<Value, WalletError>;
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, WalletError> {
    serde_json::to_value(value).map_err(|e| WalletError::Internal(e.to_string()))
}

#[async_trait]
impl CoinService for XvgCoinService {
    fn coin(&self) -> Coin {
        Coin::Verge
    }

    fn address_create(&self, ticker: &str) -> Result<GeneratedAddress, WalletError> {
        let created = XvgCoinService::address_create(self, ticker)?;
        Ok(GeneratedAddress {
            address: created.address,
            private_key: created.private_key,
            public_key: created.public_key,
        })
    }

    fn address_validate(
        &self,
        ticker: &str,
        address: &str,
        private_key: &str,
        public_key: &str,
    ) -> AddressCheck {
        match XvgCoinService::address_validate(self, ticker, address, private_key, public_key) {
            AddressValidity::Valid => AddressCheck::Valid,
            AddressValidity::Invalid(reason) => AddressCheck::Invalid(reason),
        }
    }

    async fn tx_build(&self, ticker: &str, params: Value) -> Result<Value, WalletError> {
        let request: BuildRequest = serde_json::from_value(params)
            .map_err(|e| WalletError::InvalidParams(format!("invalid build request: {e}")))?;
        let built = XvgCoinService::tx_build(self, ticker, &request).await?;
        to_json(&built)
    }

    fn tx_sign(
        &self,
        ticker: &str,
        private_keys: &HashMap<String, String>,
        params: &Value,
    ) -> Result<SignedPayload, WalletError> {
        let signed = XvgCoinService::tx_sign(self, ticker, private_keys, params)?;
        Ok(SignedPayload {
            signed_data: signed.signed_data,
            tx_hash: signed.tx_hash,
        })
    }

    async fn tx_broadcast(
        &self,
        ticker: &str,
        signed: &SignedPayload,
    ) -> Result<Value, WalletError> {
        let signed = SignedTx {
            signed_data: signed.signed_data.clone(),
            tx_hash: signed.tx_hash.clone(),
        };
        let result = XvgCoinService::tx_broadcast(self, ticker, &signed).await?;
        to_json(&result)
    }

    async fn balance_by_address(&self, ticker: &str, address: &str) -> Result<Value, WalletError> {
        let balance = XvgCoinService::balance_by_address(self, ticker, address).await?;
        to_json(&balance)
    }

    async fn tx_by_hash(&self, ticker: &str, hash: &str) -> Result<Value, WalletError> {
        let tx = XvgCoinService::tx_by_hash(self, ticker, hash).await?;
        to_json(&tx)
    }
}
