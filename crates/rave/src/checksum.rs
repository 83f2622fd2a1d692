//! Integrity checksums (`integrity_hash`) for outgoing requests.
//!
//! The digest is `hex(sha256(v1 ++ v2 ++ ... ++ vn ++ secret))` where
//! `v1..vn` are the canonical renderings of the request's field values in the
//! request kind's canonical order. The processor recomputes the same value, so
//! the order and the number formatting must match exactly.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::ChecksumError;
use crate::params::{ParamValue, Params};

/// Hex length of a SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Computes integrity checksums with one merchant secret.
#[derive(Clone)]
pub struct ChecksumGenerator {
    secret_key: String,
}

impl ChecksumGenerator {
    pub fn new(secret_key: impl Into<String>) -> Result<Self, ChecksumError> {
        let secret_key = secret_key.into();
        if secret_key.is_empty() {
            return Err(ChecksumError::EmptySecret);
        }
        Ok(Self { secret_key })
    }

    /// Hash the values of `params` in the given canonical `order`.
    ///
    /// Fields present in `params` but not named in `order` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError::MissingField`] for the first name in `order`
    /// that `params` does not contain, and [`ChecksumError::NonFiniteValue`]
    /// for a `NaN` or infinite decimal.
    pub fn generate(&self, order: &[&str], params: &Params) -> Result<String, ChecksumError> {
        let mut input = String::new();
        for name in order {
            let value = params
                .get(name)
                .ok_or_else(|| ChecksumError::MissingField((*name).to_string()))?;
            input.push_str(&render(name, value)?);
        }
        Ok(self.digest(input))
    }

    /// Hash every field of `params` in byte-wise name order.
    ///
    /// This is the rule the API documents for arbitrary parameter sets.
    pub fn generate_sorted(&self, params: &Params) -> Result<String, ChecksumError> {
        let mut input = String::new();
        for (name, value) in params.iter() {
            input.push_str(&render(name, value)?);
        }
        Ok(self.digest(input))
    }

    /// Constant-time check of a received digest against the expected one.
    pub fn verify(
        &self,
        order: &[&str],
        params: &Params,
        received: &str,
    ) -> Result<bool, ChecksumError> {
        let expected = self.generate(order, params)?;
        Ok(expected
            .as_bytes()
            .ct_eq(received.to_ascii_lowercase().as_bytes())
            .into())
    }

    fn digest(&self, mut input: String) -> String {
        input.push_str(&self.secret_key);
        hex::encode(Sha256::digest(input.as_bytes()))
    }
}

fn render(name: &str, value: &ParamValue) -> Result<String, ChecksumError> {
    if !value.is_finite() {
        return Err(ChecksumError::NonFiniteValue(name.to_string()));
    }
    Ok(value.canonical())
}

impl std::fmt::Debug for ChecksumGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumGenerator")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// A request kind whose checksum field order is fixed.
pub trait IntegrityFields {
    /// Field names in the order the processor concatenates them.
    const CANONICAL_ORDER: &'static [&'static str];

    /// The request's fields as parameters.
    fn integrity_params(&self) -> Params;

    /// Compute this request's `integrity_hash`.
    fn integrity_hash(&self, generator: &ChecksumGenerator) -> Result<String, ChecksumError> {
        generator.generate(Self::CANONICAL_ORDER, &self.integrity_params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "FLWSECK-bb971402072265fb156e90a3578fe5e6-X";

    #[test]
    fn digest_is_64_lowercase_hex_chars() {
        let generator = ChecksumGenerator::new(SECRET).unwrap();
        let params = Params::new().with("a", "abc").with("b", 1);
        let digest = generator.generate(&["a", "b"], &params).unwrap();
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn concatenates_in_given_order_then_secret() {
        // sha256("abc" ++ "1" ++ "s")
        let generator = ChecksumGenerator::new("s").unwrap();
        let params = Params::new().with("x", "abc").with("y", 1);
        assert_eq!(
            generator.generate(&["x", "y"], &params).unwrap(),
            "8d3f2176b9ad0610dd9948e9eaa3eafa88337f5f6897768b864206a48da1749f"
        );
    }

    #[test]
    fn order_changes_the_digest() {
        let generator = ChecksumGenerator::new(SECRET).unwrap();
        let params = Params::new().with("x", "abc").with("y", "def");
        assert_ne!(
            generator.generate(&["x", "y"], &params).unwrap(),
            generator.generate(&["y", "x"], &params).unwrap()
        );
    }

    #[test]
    fn numeric_and_string_forms_hash_identically() {
        let generator = ChecksumGenerator::new(SECRET).unwrap();
        let numeric = Params::new().with("amount", 20);
        let text = Params::new().with("amount", "20");
        assert_eq!(
            generator.generate(&["amount"], &numeric).unwrap(),
            generator.generate(&["amount"], &text).unwrap()
        );
    }

    #[test]
    fn missing_field_is_an_error() {
        let generator = ChecksumGenerator::new(SECRET).unwrap();
        let params = Params::new().with("amount", 20);
        assert_eq!(
            generator.generate(&["amount", "currency"], &params),
            Err(ChecksumError::MissingField("currency".into()))
        );
    }

    #[test]
    fn extra_fields_are_ignored_by_ordered_generation() {
        let generator = ChecksumGenerator::new(SECRET).unwrap();
        let base = Params::new().with("amount", 20);
        let extra = base.clone().with("note", "ignored");
        assert_eq!(
            generator.generate(&["amount"], &base).unwrap(),
            generator.generate(&["amount"], &extra).unwrap()
        );
    }

    #[test]
    fn sorted_generation_matches_byte_order() {
        let generator = ChecksumGenerator::new(SECRET).unwrap();
        let params = Params::new()
            .with("amount", 20)
            .with("PBFPubKey", "pk")
            .with("currency", "NGN");
        assert_eq!(
            generator.generate_sorted(&params).unwrap(),
            generator
                .generate(&["PBFPubKey", "amount", "currency"], &params)
                .unwrap()
        );
    }

    #[test]
    fn non_finite_decimals_are_rejected() {
        let generator = ChecksumGenerator::new(SECRET).unwrap();
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let params = Params::new().with("amount", amount).with("currency", "NGN");
            assert_eq!(
                generator.generate(&["amount", "currency"], &params),
                Err(ChecksumError::NonFiniteValue("amount".into()))
            );
            assert_eq!(
                generator.generate_sorted(&params),
                Err(ChecksumError::NonFiniteValue("amount".into()))
            );
        }

        let params = Params::new().with("amount", 20.5);
        assert!(generator.generate_sorted(&params).is_ok());
    }

    #[test]
    fn verify_accepts_matching_and_rejects_tampered() {
        let generator = ChecksumGenerator::new(SECRET).unwrap();
        let params = Params::new().with("amount", 20).with("currency", "NGN");
        let order = ["amount", "currency"];
        let digest = generator.generate(&order, &params).unwrap();
        assert!(generator.verify(&order, &params, &digest).unwrap());
        assert!(generator
            .verify(&order, &params, &digest.to_uppercase())
            .unwrap());

        let tampered = params.with("amount", 2000);
        assert!(!generator.verify(&order, &tampered, &digest).unwrap());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            ChecksumGenerator::new(""),
            Err(ChecksumError::EmptySecret)
        ));
    }
}
