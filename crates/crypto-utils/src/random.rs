use rand::RngCore;
use rand_core::OsRng;

/// Fills an `N`-byte array from the OS RNG.
///
/// Private key candidates are drawn through this; the caller still has to
/// reject values outside the curve order.
pub fn random_bytes_fixed<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}
