use std::fmt;

use crypto_utils::hash::{checksum, hash160};
use serde::{Serialize, Serializer};

use crate::error::{AddressError, XvgError};
use crate::keys;
use crate::network::{XvgNetwork, TICKER};

/// Shortest rendered address accepted by validation.
pub const MIN_ADDRESS_LEN: usize = 26;
/// Longest rendered address accepted by validation.
pub const MAX_ADDRESS_LEN: usize = 35;

/// A decoded Base58Check P2PKH address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    pub version: u8,
    pub pubkey_hash: [u8; 20],
}

/// Derive a P2PKH address from a 33-byte compressed secp256k1 public key.
///
/// Steps:
/// 1. HASH160(pubkey) -> 20-byte pubkey hash
/// 2. Prepend the network version byte
/// 3. Base58Check encode (4-byte SHA-256d checksum)
pub fn pubkey_to_address(pubkey_bytes: &[u8; 33], network: XvgNetwork) -> Result<String, XvgError> {
    if pubkey_bytes[0] != 0x02 && pubkey_bytes[0] != 0x03 {
        return Err(XvgError::InvalidPublicKey(
            "compressed key must start with 0x02 or 0x03".into(),
        ));
    }
    Ok(encode_hash(&hash160(pubkey_bytes), network))
}

/// Same as [`pubkey_to_address`] but takes the public key as hex.
pub fn pubkey_hex_to_address(pubkey_hex: &str, network: XvgNetwork) -> Result<String, XvgError> {
    let bytes: [u8; 33] = hex::decode(pubkey_hex.trim())
        .map_err(|e| XvgError::InvalidPublicKey(format!("invalid hex: {e}")))?
        .try_into()
        .map_err(|v: Vec<u8>| {
            XvgError::InvalidPublicKey(format!("expected 33 bytes, got {}", v.len()))
        })?;
    pubkey_to_address(&bytes, network)
}

fn encode_hash(pubkey_hash: &[u8; 20], network: XvgNetwork) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(network.pubkey_address_version());
    payload.extend_from_slice(pubkey_hash);
    bs58::encode(payload).with_check().into_string()
}

/// Decode an address and verify its version byte and checksum.
///
/// Version is checked before the checksum so a well-formed address from
/// another network reports the more useful error.
pub fn decode_address(address: &str, network: XvgNetwork) -> Result<DecodedAddress, AddressError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|_| AddressError::InvalidFormat)?;

    if decoded.len() < 5 {
        return Err(AddressError::InvalidFormat);
    }

    let expected_version = network.pubkey_address_version();
    if decoded[0] != expected_version {
        return Err(AddressError::InvalidVersion {
            expected: expected_version,
            actual: decoded[0],
        });
    }

    let (payload, check) = decoded.split_at(decoded.len() - 4);
    if check != checksum(payload) {
        return Err(AddressError::InvalidChecksum);
    }

    let pubkey_hash: [u8; 20] = payload[1..]
        .try_into()
        .map_err(|_| AddressError::InvalidFormat)?;

    Ok(DecodedAddress {
        version: payload[0],
        pubkey_hash,
    })
}

/// Outcome of [`validate_address`]: either valid, or the reason the first
/// failing check gave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressValidity {
    Valid,
    Invalid(String),
}

impl AddressValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, AddressValidity::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            AddressValidity::Valid => None,
            AddressValidity::Invalid(reason) => Some(reason),
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        AddressValidity::Invalid(reason.into())
    }
}

impl fmt::Display for AddressValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressValidity::Valid => f.write_str("true"),
            AddressValidity::Invalid(reason) => f.write_str(reason),
        }
    }
}

/// Serializes as JSON `true` or the reason string.
impl Serialize for AddressValidity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AddressValidity::Valid => serializer.serialize_bool(true),
            AddressValidity::Invalid(reason) => serializer.serialize_str(reason),
        }
    }
}

/// Check an address against the keypair that supposedly owns it.
///
/// Checks run in order: missing parameters, rendered length, Base58Check
/// structure (format, version, checksum), keypair consistency, and finally
/// that the public key re-encodes to exactly `address`. Never fails; every
/// problem is reported as [`AddressValidity::Invalid`].
pub fn validate_address(
    ticker: &str,
    address: &str,
    private_key_hex: &str,
    public_key_hex: &str,
    network: XvgNetwork,
) -> AddressValidity {
    if ticker != TICKER {
        return AddressValidity::invalid(format!("Unsupported ticker: {ticker}"));
    }

    if address.is_empty() || private_key_hex.is_empty() || public_key_hex.is_empty() {
        return AddressValidity::invalid("Missing required parameters");
    }

    let length = address.chars().count();
    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&length) {
        return AddressValidity::invalid("Invalid address length");
    }

    if let Err(e) = decode_address(address, network) {
        return AddressValidity::invalid(e.to_string());
    }

    match keys::validate_keypair(private_key_hex, public_key_hex) {
        Ok(()) => {}
        Err(XvgError::KeyMismatch) => {
            return AddressValidity::invalid("Public key does not match private key")
        }
        Err(_) => return AddressValidity::invalid("Invalid key pair"),
    }

    match pubkey_hex_to_address(public_key_hex, network) {
        Ok(derived) if derived == address => AddressValidity::Valid,
        Ok(_) => AddressValidity::invalid("Address does not match public key"),
        Err(_) => AddressValidity::invalid("Invalid key pair"),
    }
}
