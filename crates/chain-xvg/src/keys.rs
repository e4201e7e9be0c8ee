use crypto_utils::random::random_bytes_fixed;
use crypto_utils::secret::SecretBytes32;
use k256::ecdsa::SigningKey;
use zeroize::Zeroizing;

use crate::error::XvgError;

/// A secp256k1 keypair. The public key is always the compressed point of the
/// private scalar.
#[derive(Clone)]
pub struct KeyPair {
    private_key: SecretBytes32,
    public_key: [u8; 33],
}

impl KeyPair {
    /// Build a keypair from raw scalar bytes, rejecting zero and values at or
    /// above the curve order.
    pub fn from_private_bytes(private_key: SecretBytes32) -> Result<Self, XvgError> {
        let public_key = derive_public_key(&private_key)?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn from_private_hex(private_key_hex: &str) -> Result<Self, XvgError> {
        let secret = parse_private_key(private_key_hex)?;
        Self::from_private_bytes(secret)
    }

    pub fn private_key(&self) -> &SecretBytes32 {
        &self.private_key
    }

    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    pub fn private_key_hex(&self) -> Zeroizing<String> {
        self.private_key.to_hex()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Draw random 32-byte candidates until one is a valid non-zero scalar.
///
/// Out-of-range draws happen with probability below 2^-127, so this almost
/// always returns on the first iteration.
pub fn generate_keypair() -> KeyPair {
    loop {
        let candidate = SecretBytes32::new(random_bytes_fixed::<32>());
        if candidate.is_zero() {
            continue;
        }
        if let Ok(pair) = KeyPair::from_private_bytes(candidate) {
            return pair;
        }
    }
}

/// Compressed SEC1 public key (33 bytes) for a private scalar.
pub fn derive_public_key(private_key: &SecretBytes32) -> Result<[u8; 33], XvgError> {
    let point = signing_key(private_key)?
        .verifying_key()
        .to_encoded_point(true);
    point
        .as_bytes()
        .try_into()
        .map_err(|_| XvgError::InvalidPublicKey("unexpected compressed key length".into()))
}

/// Recompute the public key from `private_key_hex` and require byte-exact
/// equality with `public_key_hex`.
pub fn validate_keypair(private_key_hex: &str, public_key_hex: &str) -> Result<(), XvgError> {
    let secret = parse_private_key(private_key_hex)?;
    let derived = derive_public_key(&secret)?;
    let claimed = hex::decode(public_key_hex.trim())
        .map_err(|e| XvgError::InvalidPublicKey(format!("invalid hex: {e}")))?;
    if claimed.as_slice() != derived.as_slice() {
        return Err(XvgError::KeyMismatch);
    }
    Ok(())
}

pub(crate) fn parse_private_key(private_key_hex: &str) -> Result<SecretBytes32, XvgError> {
    SecretBytes32::from_hex(private_key_hex).map_err(|e| XvgError::InvalidPrivateKey(e.to_string()))
}

pub(crate) fn signing_key(private_key: &SecretBytes32) -> Result<SigningKey, XvgError> {
    SigningKey::from_bytes(private_key.as_bytes().into())
        .map_err(|e| XvgError::InvalidPrivateKey(format!("invalid secp256k1 scalar: {e}")))
}
