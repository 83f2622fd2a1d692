use thiserror::Error;

/// Errors produced while deriving the 3DES key or running the cipher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("secret key is empty")]
    EmptySecret,

    #[error("secret key is too short to derive a 3DES key (need at least {0} characters after the prefix)")]
    SecretTooShort(usize),

    #[error("derived key has an invalid length for TDES-EDE3")]
    InvalidKey,

    #[error("ciphertext is not valid base64: {0}")]
    Decode(String),

    #[error("ciphertext padding is invalid")]
    Unpad,

    #[error("decrypted payload is not valid UTF-8")]
    Utf8,
}

/// Errors produced while building an integrity checksum.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("field \"{0}\" is required to compute the integrity checksum")]
    MissingField(String),

    #[error("field \"{0}\" is not a finite number")]
    NonFiniteValue(String),

    #[error("secret key is empty")]
    EmptySecret,
}

/// Errors returned by Rave operations.
#[derive(Debug, Error)]
pub enum RaveError {
    #[error("config error: {0}")]
    Configuration(String),

    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("checksum error: {0}")]
    Checksum(#[from] ChecksumError),

    /// A request was built without a parameter the endpoint requires.
    #[error("\"{0}\" is a required parameter for this method")]
    MissingParameter(String),

    /// The API answered with an error status or an error body.
    #[error("{message} Status Code: {status}")]
    Api { message: String, status: u16 },

    /// A verified transaction does not match what the merchant expected.
    #[error("transaction verification failed: {0}")]
    Verification(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
