// Password hashing.
//
// scrypt (N=16384, r=16, p=1, dkLen=64) with a random 16-byte salt.
// Output format: "hex(salt):hex(key)".

use rand::RngCore;
use scrypt::{scrypt, Params};

use tasklight_core::error::{AuthError, Result};

/// Hash a password with scrypt and a fresh random salt.
///
/// Returns `salt:key` with both parts hex-encoded. Two calls with the
/// same input produce different outputs.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt_hex = hex::encode(salt_bytes);

    let key = derive_key(password, &salt_hex)?;
    Ok(format!("{}:{}", salt_hex, hex::encode(key)))
}

/// Verify a password against a hash produced by `hash_password`.
///
/// Malformed or unrecognized hash encodings verify as `false`, never
/// as an error.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let Some((salt, key_hex)) = hash.split_once(':') else {
        return false;
    };
    let Ok(expected_key) = hex::decode(key_hex) else {
        return false;
    };
    let Ok(derived_key) = derive_key(password, salt) else {
        return false;
    };
    super::constant_time_equal(&derived_key, &expected_key)
}

/// Derive a 64-byte key using scrypt.
fn derive_key(password: &str, salt: &str) -> Result<Vec<u8>> {
    // N=16384 → log2(N)=14, r=16, p=1, dkLen=64
    let params = Params::new(14, 16, 1, 64)
        .map_err(|e| AuthError::Crypto(format!("invalid scrypt params: {e}")))?;

    let mut output = vec![0u8; 64];
    scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut output)
        .map_err(|e| AuthError::Crypto(format!("scrypt failed: {e}")))?;

    Ok(output)
}
