//! Hash functions used by Base58Check addresses and transaction digests.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice, as used by Base58Check checksums.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// First 4 bytes of `double_sha256(data)`.
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let digest = double_sha256(data);
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// HASH160: RIPEMD-160(SHA-256(data)).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// Keccak-256 (the pre-standard SHA-3 padding).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}
