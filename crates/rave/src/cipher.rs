//! 3DES-24 encryption of card payloads.
//!
//! The API expects the card payload as `client` together with
//! `alg = "3DES-24"`: TDES-EDE3 in ECB mode with PKCS#7 padding, encoded as
//! standard base64. The 24-byte key is derived from the merchant secret:
//!
//! ```text
//! adjusted = secret without the "FLWSECK-" prefix
//! key      = adjusted[..12] ++ hex(md5(secret))[20..32]
//! ```
//!
//! ECB without an IV makes the output deterministic. The processor re-derives
//! the same key on its side, so this must not be replaced with a randomized
//! mode.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use des::TdesEde3;
use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use md5::{Digest, Md5};

use crate::error::EncryptionError;

type TdesEcbEnc = ecb::Encryptor<TdesEde3>;
type TdesEcbDec = ecb::Decryptor<TdesEde3>;

/// Algorithm tag sent alongside the encrypted payload.
pub const ALGORITHM: &str = "3DES-24";

/// Prefix stripped from the secret before taking its first characters.
pub const SECRET_KEY_PREFIX: &str = "FLWSECK-";

/// Byte length of a TDES-EDE3 key.
pub const KEY_LEN: usize = 24;

const SECRET_PART_LEN: usize = 12;
const DIGEST_PART_LEN: usize = 12;

/// Derive the 24-byte 3DES key from a merchant secret key.
///
/// # Errors
///
/// Returns [`EncryptionError::EmptySecret`] for an empty secret and
/// [`EncryptionError::SecretTooShort`] when fewer than 12 characters remain
/// after the prefix is removed.
pub fn derive_key(secret_key: &str) -> Result<[u8; KEY_LEN], EncryptionError> {
    if secret_key.is_empty() {
        return Err(EncryptionError::EmptySecret);
    }

    let adjusted = secret_key.replace(SECRET_KEY_PREFIX, "");
    let head = adjusted
        .as_bytes()
        .get(..SECRET_PART_LEN)
        .ok_or(EncryptionError::SecretTooShort(SECRET_PART_LEN))?;

    let digest_hex = hex::encode(Md5::digest(secret_key.as_bytes()));
    let tail = &digest_hex.as_bytes()[digest_hex.len() - DIGEST_PART_LEN..];

    let mut key = [0u8; KEY_LEN];
    key[..SECRET_PART_LEN].copy_from_slice(head);
    key[SECRET_PART_LEN..].copy_from_slice(tail);
    Ok(key)
}

/// Deterministic 3DES-24 cipher bound to one derived key.
#[derive(Clone)]
pub struct CardCipher {
    key: [u8; KEY_LEN],
}

impl CardCipher {
    /// Derive the key from `secret_key` once; every later call reuses it.
    pub fn new(secret_key: &str) -> Result<Self, EncryptionError> {
        Ok(Self {
            key: derive_key(secret_key)?,
        })
    }

    /// Encrypt `plaintext` and return standard base64.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let cipher =
            TdesEcbEnc::new_from_slice(&self.key).map_err(|_| EncryptionError::InvalidKey)?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Ok(STANDARD.encode(ciphertext))
    }

    /// Reverse [`CardCipher::encrypt`].
    pub fn decrypt(&self, encoded: &str) -> Result<String, EncryptionError> {
        let ciphertext = STANDARD
            .decode(encoded)
            .map_err(|e| EncryptionError::Decode(e.to_string()))?;
        let cipher =
            TdesEcbDec::new_from_slice(&self.key).map_err(|_| EncryptionError::InvalidKey)?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| EncryptionError::Unpad)?;
        String::from_utf8(plaintext).map_err(|_| EncryptionError::Utf8)
    }
}

impl std::fmt::Debug for CardCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// One-shot helper: derive the key from `secret_key` and encrypt `plaintext`.
pub fn encrypt_3des(plaintext: &str, secret_key: &str) -> Result<String, EncryptionError> {
    CardCipher::new(secret_key)?.encrypt(plaintext)
}
