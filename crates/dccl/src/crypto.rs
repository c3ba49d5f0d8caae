// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Body encryption under a passphrase-derived key.
//!
//! The key is SHA-256 of the passphrase. Per message, the 6 cleartext
//! header bytes serve as the nonce: a keystream is derived with
//! HKDF-SHA256 (extract with the header as salt, expand to the body
//! length) and XORed over the body. The transform is length-preserving
//! and self-inverse, so decrypt is the same operation, and the id prefix
//! and header stay readable for dispatch before decryption.

use crate::error::{DcclError, Result};
use ring::digest;
use ring::hkdf;
use zeroize::Zeroize;

/// Context string separating this keystream from other HKDF uses.
const KEYSTREAM_INFO: &[u8] = b"dccl body keystream";

/// Passphrase-derived body cipher key.
pub struct CryptoKey {
    key: [u8; 32],
}

impl CryptoKey {
    /// Derive a key: SHA-256 of the passphrase.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let hash = digest::digest(&digest::SHA256, passphrase.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(hash.as_ref());
        Self { key }
    }

    /// XOR the body with the keystream for `nonce`.
    ///
    /// Applying the transform twice with the same nonce restores the
    /// input, so this is both encrypt and decrypt.
    pub fn apply_keystream(&self, nonce: &[u8], body: &mut [u8]) -> Result<()> {
        if body.is_empty() {
            return Ok(());
        }
        let salt = hkdf::Salt::new(hkdf::HKDF_SHA256, nonce);
        let prk = salt.extract(&self.key);
        let okm = prk
            .expand(&[KEYSTREAM_INFO], KeystreamLen(body.len()))
            .map_err(|_| {
                DcclError::CryptoError(format!(
                    "cannot expand a {}-byte keystream (HKDF limit)",
                    body.len()
                ))
            })?;
        let mut keystream = vec![0u8; body.len()];
        okm.fill(&mut keystream)
            .map_err(|_| DcclError::CryptoError("keystream fill failed".to_string()))?;
        for (byte, k) in body.iter_mut().zip(&keystream) {
            *byte ^= k;
        }
        keystream.zeroize();
        Ok(())
    }
}

impl Drop for CryptoKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// HKDF output length marker.
struct KeystreamLen(usize);

impl hkdf::KeyType for KeystreamLen {
    fn len(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_is_self_inverse() {
        let key = CryptoKey::from_passphrase("secret");
        let nonce = [0x20, 0x01, 0x00, 0x00, 0x00, 0x00];
        let original = b"hello acoustic world".to_vec();

        let mut body = original.clone();
        key.apply_keystream(&nonce, &mut body).unwrap();
        assert_ne!(body, original);
        key.apply_keystream(&nonce, &mut body).unwrap();
        assert_eq!(body, original);
    }

    #[test]
    fn test_keystream_is_deterministic() {
        let nonce = [1, 2, 3, 4, 5, 6];
        let mut a = vec![0u8; 16];
        let mut b = vec![0u8; 16];
        CryptoKey::from_passphrase("secret")
            .apply_keystream(&nonce, &mut a)
            .unwrap();
        CryptoKey::from_passphrase("secret")
            .apply_keystream(&nonce, &mut b)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_passphrases_differ() {
        let nonce = [1, 2, 3, 4, 5, 6];
        let mut a = vec![0u8; 16];
        let mut b = vec![0u8; 16];
        CryptoKey::from_passphrase("secret")
            .apply_keystream(&nonce, &mut a)
            .unwrap();
        CryptoKey::from_passphrase("other")
            .apply_keystream(&nonce, &mut b)
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_nonces_differ() {
        let key = CryptoKey::from_passphrase("secret");
        let mut a = vec![0u8; 16];
        let mut b = vec![0u8; 16];
        key.apply_keystream(&[1, 2, 3, 4, 5, 6], &mut a).unwrap();
        key.apply_keystream(&[1, 2, 3, 4, 5, 7], &mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_body_is_noop() {
        let key = CryptoKey::from_passphrase("secret");
        let mut body: Vec<u8> = Vec::new();
        key.apply_keystream(&[0; 6], &mut body).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_keystream_beyond_hkdf_limit_fails() {
        let key = CryptoKey::from_passphrase("secret");
        let mut body = vec![0u8; 255 * 32 + 1];
        assert!(matches!(
            key.apply_keystream(&[0; 6], &mut body),
            Err(DcclError::CryptoError(_))
        ));
    }
}
