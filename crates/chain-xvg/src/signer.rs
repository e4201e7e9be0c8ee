//! Per-input ECDSA signing of built transactions.
//!
//! Each `from` entry gets its own signature over the Keccak-256 digest of a
//! canonical JSON message `{"from": input, "to": outputs, "fee": fee}`. The
//! transaction hash is the Keccak-256 digest of the canonical JSON of the whole
//! [`BuildResult`]. Canonical means serde's struct field order with
//! `BTreeMap`-ordered maps and decimal amounts as strings.

use std::collections::HashMap;

use crypto_utils::hash::keccak256;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::Signature;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::XvgError;
use crate::keys::{parse_private_key, signing_key};
use crate::network::ensure_ticker;
use crate::types::{BuildResult, Fee, SignedTx, TxInput, TxOutput, BUILD_RESULT_FIELDS};

#[derive(Serialize)]
struct SigningMessage<'a> {
    from: &'a TxInput,
    to: &'a [TxOutput],
    fee: &'a Fee,
}

/// Digest signed for one input.
pub fn signing_digest(input: &TxInput, to: &[TxOutput], fee: &Fee) -> Result<[u8; 32], XvgError> {
    let message = serde_json::to_vec(&SigningMessage {
        from: input,
        to,
        fee,
    })
    .map_err(|e| XvgError::SigningError(format!("failed to encode signing message: {e}")))?;
    Ok(keccak256(&message))
}

/// Hex Keccak-256 of the canonical encoding of the whole transaction.
pub fn transaction_hash(built: &BuildResult) -> Result<String, XvgError> {
    let encoded = serde_json::to_vec(built)
        .map_err(|e| XvgError::SigningError(format!("failed to encode transaction: {e}")))?;
    Ok(hex::encode(keccak256(&encoded)))
}

/// Sign a built transaction handed over as untyped JSON.
///
/// The payload must be an object whose keys are a subset of
/// `{from, to, fee, spent, utxo}`; any other key fails with
/// [`XvgError::UnexpectedFields`] listing every offender.
pub fn sign_transaction(
    ticker: &str,
    private_keys: &HashMap<String, String>,
    params: &serde_json::Value,
) -> Result<SignedTx, XvgError> {
    ensure_ticker(ticker)?;

    let object = params
        .as_object()
        .ok_or_else(|| XvgError::InvalidParams("transaction params must be an object".into()))?;

    let mut unexpected: Vec<String> = object
        .keys()
        .filter(|key| !BUILD_RESULT_FIELDS.contains(&key.as_str()))
        .cloned()
        .collect();
    unexpected.sort();
    if !unexpected.is_empty() {
        return Err(XvgError::UnexpectedFields(unexpected));
    }

    if !object.contains_key("from") || !object.contains_key("to") {
        return Err(XvgError::InvalidParams(
            "invalid transaction structure: missing \"from\" or \"to\"".into(),
        ));
    }

    let built: BuildResult = serde::Deserialize::deserialize(params)
        .map_err(|e| XvgError::InvalidParams(format!("malformed transaction: {e}")))?;
    sign_built(&built, private_keys)
}

/// Sign an already typed transaction. Keys are hex private keys by address.
pub fn sign_built(
    built: &BuildResult,
    private_keys: &HashMap<String, String>,
) -> Result<SignedTx, XvgError> {
    if built.from.is_empty() || built.to.is_empty() {
        return Err(XvgError::InvalidParams(
            "missing sender or recipient information".into(),
        ));
    }

    let mut signed_data = Vec::with_capacity(built.from.len());
    for input in &built.from {
        let key_hex = private_keys
            .get(&input.address)
            .ok_or_else(|| XvgError::MissingPrivateKey(input.address.clone()))?;
        let secret = parse_private_key(key_hex)?;
        let key = signing_key(&secret)?;

        let digest = signing_digest(input, &built.to, &built.fee)?;
        let signature: Signature = key
            .sign_prehash(&digest)
            .map_err(|e| XvgError::SigningError(e.to_string()))?;
        debug!(address = %input.address, "input signed");
        signed_data.push(hex::encode(signature.to_der().as_bytes()));
    }

    let tx_hash = transaction_hash(built)?;
    info!(signatures = signed_data.len(), %tx_hash, "transaction signed");
    Ok(SignedTx {
        signed_data,
        tx_hash,
    })
}
