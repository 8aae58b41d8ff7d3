use base64::{engine::general_purpose::STANDARD, Engine as _};
use constant_time_eq::constant_time_eq;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::Error;

const SALT_LEN: usize = 16;

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Produces `salt$digest`, both base64 encoded.
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    format!(
        "{}${}",
        STANDARD.encode(salt),
        STANDARD.encode(digest(&salt, password))
    )
}

pub fn verify(password: &str, stored: &str) -> Result<bool, Error> {
    let (salt, expected) = stored
        .split_once('$')
        .ok_or_else(Error::unexpected_error)?;

    let salt = STANDARD.decode(salt).map_err(|_| Error::unexpected_error())?;
    let expected = STANDARD
        .decode(expected)
        .map_err(|_| Error::unexpected_error())?;

    Ok(constant_time_eq(&digest(&salt, password), &expected))
}

#[test]
fn verify_test() {
    let stored = hash("hunter22");

    assert!(verify("hunter22", &stored).unwrap());
    assert!(!verify("hunter23", &stored).unwrap());
}

#[test]
fn salts_differ_test() {
    assert_ne!(hash("same-password"), hash("same-password"));
}

#[test]
fn malformed_hash_test() {
    assert!(verify("anything", "no-separator").is_err());
}
