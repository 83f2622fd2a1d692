//! Client library for the Flutterwave Rave payments API.
//!
//! Card payloads are encrypted with 3DES-24 before they leave the process and
//! hosted-payment requests carry a SHA-256 `integrity_hash` over their fields.
//! Both primitives are pure and available without the `full` feature; the
//! async [`RaveClient`] wraps the charge, validate, verify, xrequery, bank list
//! and fee endpoints on top of them.
//!
//! # Quick example
//!
//! ```no_run
//! use rave::{CardCharge, RaveClient, RaveConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), rave::RaveError> {
//! let client = RaveClient::new(RaveConfig::from_env()?)?;
//!
//! let card = CardCharge::new(
//!     "5438898014560229", "789", "09", "19", "300",
//!     "tester@flutter.co", "MXX-ASC-4578",
//! )
//! .with_pin("3310");
//!
//! let resp = client.charge_card(&card).await?;
//! println!("{}", resp.message);
//! # Ok(())
//! # }
//! ```

// Pure primitives
pub mod checksum;
pub mod cipher;
pub mod error;
pub mod params;

// Request and response types
pub mod config;
pub mod constants;
pub mod payment;
pub mod response;

// HTTP client
#[cfg(feature = "full")]
pub mod http_client;

// Re-exports
pub use checksum::{ChecksumGenerator, IntegrityFields};
pub use cipher::{encrypt_3des, CardCipher};
pub use config::RaveConfig;
pub use constants::Environment;
pub use error::{ChecksumError, EncryptionError, RaveError};
pub use params::{ParamValue, Params};
pub use payment::*;
pub use response::*;

#[cfg(feature = "full")]
pub use http_client::RaveClient;
