use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::CryptoError;

/// A 32-byte secret scalar that is zeroed when dropped.
///
/// Holds raw private key material between hex parsing and signing so the
/// bytes never outlive the operation that needs them.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes32([u8; 32]);

impl SecretBytes32 {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex string (case-insensitive).
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let decoded = Zeroizing::new(
            hex::decode(hex_str.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?,
        );
        if decoded.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: decoded.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex rendering, itself zeroized on drop.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for SecretBytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBytes32(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn from_hex_roundtrip() {
        let secret = SecretBytes32::from_hex(KEY_ONE).unwrap();
        assert_eq!(secret.as_bytes()[31], 1);
        assert_eq!(secret.to_hex().as_str(), KEY_ONE);
    }

    #[test]
    fn from_hex_accepts_upper_case() {
        let secret = SecretBytes32::from_hex(&"AB".repeat(32)).unwrap();
        assert_eq!(secret.as_bytes(), &[0xab; 32]);
    }

    #[test]
    fn from_hex_rejects_short_input() {
        match SecretBytes32::from_hex("0102") {
            Err(CryptoError::InvalidKeyLength { expected, actual }) => {
                assert_eq!(expected, 32);
                assert_eq!(actual, 2);
            }
            other => panic!("expected InvalidKeyLength, got {other:?}"),
        }
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            SecretBytes32::from_hex("not hex at all"),
            Err(CryptoError::InvalidHex(_))
        ));
    }

    #[test]
    fn zero_detection() {
        assert!(SecretBytes32::new([0u8; 32]).is_zero());
        assert!(!SecretBytes32::from_hex(KEY_ONE).unwrap().is_zero());
    }

    #[test]
    fn debug_does_not_leak_bytes() {
        let secret = SecretBytes32::new([0xaa; 32]);
        let debug = format!("{secret:?}");
        assert!(!debug.contains("aa"));
        assert!(!debug.contains("170"));
    }

    #[test]
    fn manual_zeroize_clears_bytes() {
        let mut secret = SecretBytes32::new([0x55; 32]);
        secret.zeroize();
        assert!(secret.is_zero());
    }
}
