//! Typed request records, one per API operation.

use serde::{Deserialize, Serialize};

use crate::checksum::IntegrityFields;
use crate::error::RaveError;
use crate::params::{ParamValue, Params};

/// Card details and customer data for a card charge.
///
/// Serialized to JSON, encrypted with [`crate::CardCipher`] and sent as the
/// `client` field. `PBFPubKey` is filled in by the client from its config.
#[derive(Clone, Serialize, Deserialize)]
pub struct CardCharge {
    #[serde(rename = "PBFPubKey", default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    pub cardno: String,
    pub cvv: String,
    pub expirymonth: String,
    pub expiryyear: String,
    pub currency: String,
    pub country: String,
    pub amount: ParamValue,
    pub email: String,
    #[serde(rename = "txRef")]
    pub tx_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonenumber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(rename = "IP", skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_auth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

impl CardCharge {
    /// A Nigerian-naira charge with the fields the charge endpoint requires.
    pub fn new(
        cardno: impl Into<String>,
        cvv: impl Into<String>,
        expirymonth: impl Into<String>,
        expiryyear: impl Into<String>,
        amount: impl Into<ParamValue>,
        email: impl Into<String>,
        tx_ref: impl Into<String>,
    ) -> Self {
        Self {
            public_key: String::new(),
            cardno: cardno.into(),
            cvv: cvv.into(),
            expirymonth: expirymonth.into(),
            expiryyear: expiryyear.into(),
            currency: "NGN".to_string(),
            country: "NG".to_string(),
            amount: amount.into(),
            email: email.into(),
            tx_ref: tx_ref.into(),
            name: None,
            phonenumber: None,
            firstname: None,
            lastname: None,
            ip: None,
            device_fingerprint: None,
            pin: None,
            suggested_auth: None,
            redirect_url: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>, country: impl Into<String>) -> Self {
        self.currency = currency.into();
        self.country = country.into();
        self
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    pub fn with_suggested_auth(mut self, auth: impl Into<String>) -> Self {
        self.suggested_auth = Some(auth.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_device_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.device_fingerprint = Some(fingerprint.into());
        self
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Check that every field the charge endpoint requires is non-empty.
    ///
    /// Optional for callers that want to fail early; [`crate::RaveClient::charge_card`]
    /// leaves this to the processor.
    pub fn validate(&self) -> Result<(), RaveError> {
        let required = [
            ("cardno", self.cardno.as_str()),
            ("cvv", self.cvv.as_str()),
            ("expirymonth", self.expirymonth.as_str()),
            ("expiryyear", self.expiryyear.as_str()),
            ("currency", self.currency.as_str()),
            ("country", self.country.as_str()),
            ("email", self.email.as_str()),
            ("txRef", self.tx_ref.as_str()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RaveError::MissingParameter((*name).to_string()));
        }
        if matches!(&self.amount, ParamValue::Text(s) if s.trim().is_empty()) {
            return Err(RaveError::MissingParameter("amount".to_string()));
        }
        Ok(())
    }

    /// Card number with everything but the last four digits masked.
    pub fn masked_cardno(&self) -> String {
        let visible = self.cardno.len().saturating_sub(4);
        let tail = self.cardno.get(visible..).unwrap_or_default();
        format!("{}{}", "*".repeat(visible), tail)
    }
}

impl std::fmt::Debug for CardCharge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardCharge")
            .field("cardno", &self.masked_cardno())
            .field("cvv", &"<redacted>")
            .field("pin", &self.pin.as_ref().map(|_| "<redacted>"))
            .field("currency", &self.currency)
            .field("amount", &self.amount)
            .field("tx_ref", &self.tx_ref)
            .field("suggested_auth", &self.suggested_auth)
            .finish_non_exhaustive()
    }
}

/// OTP validation of a pending card charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateCharge {
    pub transaction_reference: String,
    pub otp: String,
}

impl ValidateCharge {
    pub fn new(transaction_reference: impl Into<String>, otp: impl Into<String>) -> Self {
        Self {
            transaction_reference: transaction_reference.into(),
            otp: otp.into(),
        }
    }
}

/// Status lookup of a transaction by its processor reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTransaction {
    pub flw_ref: String,
    /// Ask for the normalized response shape.
    pub normalize: bool,
}

impl VerifyTransaction {
    pub fn new(flw_ref: impl Into<String>) -> Self {
        Self {
            flw_ref: flw_ref.into(),
            normalize: true,
        }
    }
}

/// Status lookup through the xrequery endpoint.
///
/// At least one of `flw_ref` and `tx_ref` must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XrequeryVerification {
    pub flw_ref: Option<String>,
    pub tx_ref: Option<String>,
    /// Only return the last attempt for the reference.
    pub last_attempt: bool,
    /// Only return the attempt matching the reference exactly.
    pub only_attempt: bool,
}

impl XrequeryVerification {
    pub fn by_tx_ref(tx_ref: impl Into<String>) -> Self {
        Self {
            tx_ref: Some(tx_ref.into()),
            last_attempt: true,
            only_attempt: true,
            ..Self::default()
        }
    }

    pub fn by_flw_ref(flw_ref: impl Into<String>) -> Self {
        Self {
            flw_ref: Some(flw_ref.into()),
            last_attempt: true,
            only_attempt: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), RaveError> {
        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if !has(&self.flw_ref) && !has(&self.tx_ref) {
            return Err(RaveError::MissingParameter("flw_ref".to_string()));
        }
        Ok(())
    }
}

/// Fee quote for an amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeQuery {
    pub amount: ParamValue,
    pub currency: String,
    /// Payment type; `2` quotes account payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptype: Option<String>,
    /// First six digits of the card, for card-specific fees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card6: Option<String>,
}

impl FeeQuery {
    pub fn new(amount: impl Into<ParamValue>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
            ptype: None,
            card6: None,
        }
    }
}

/// Hosted payment page setup; the request whose `integrity_hash` the
/// processor checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPageRequest {
    #[serde(rename = "PBFPubKey")]
    pub public_key: String,
    pub amount: ParamValue,
    pub country: String,
    pub currency: String,
    pub custom_description: String,
    pub custom_logo: String,
    pub custom_title: String,
    pub customer_email: String,
    pub customer_firstname: String,
    pub customer_lastname: String,
    pub customer_phone: String,
    pub payment_method: String,
    pub txref: String,
}

impl IntegrityFields for PaymentPageRequest {
    const CANONICAL_ORDER: &'static [&'static str] = &[
        "PBFPubKey",
        "amount",
        "country",
        "currency",
        "custom_description",
        "custom_logo",
        "custom_title",
        "customer_email",
        "customer_firstname",
        "customer_lastname",
        "customer_phone",
        "payment_method",
        "txref",
    ];

    fn integrity_params(&self) -> Params {
        Params::new()
            .with("PBFPubKey", &self.public_key)
            .with("amount", self.amount.clone())
            .with("country", &self.country)
            .with("currency", &self.currency)
            .with("custom_description", &self.custom_description)
            .with("custom_logo", &self.custom_logo)
            .with("custom_title", &self.custom_title)
            .with("customer_email", &self.customer_email)
            .with("customer_firstname", &self.customer_firstname)
            .with("customer_lastname", &self.customer_lastname)
            .with("customer_phone", &self.customer_phone)
            .with("payment_method", &self.payment_method)
            .with("txref", &self.txref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::ChecksumGenerator;

    fn master_card() -> CardCharge {
        CardCharge::new(
            "5438898014560229",
            "789",
            "09",
            "19",
            "300",
            "tester@flutter.co",
            "MXX-ASC-4578",
        )
        .with_ip("103.238.105.185")
        .with_device_fingerprint("69e6b7f0sb72037aa8428b70fbe03986c")
    }

    #[test]
    fn card_charge_serializes_with_api_field_names() {
        let mut card = master_card().with_pin("3310");
        card.public_key = "FLWPUBK-x-X".into();
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["PBFPubKey"], "FLWPUBK-x-X");
        assert_eq!(json["txRef"], "MXX-ASC-4578");
        assert_eq!(json["IP"], "103.238.105.185");
        assert_eq!(json["pin"], "3310");
        assert!(json.get("suggested_auth").is_none());
        assert!(json.get("redirect_url").is_none());
    }

    #[test]
    fn card_charge_validation_names_the_missing_field() {
        let mut card = master_card();
        card.cvv.clear();
        let err = card.validate().unwrap_err();
        assert_eq!(err.to_string(), "\"cvv\" is a required parameter for this method");

        let mut card = master_card();
        card.amount = ParamValue::from("");
        assert!(matches!(
            card.validate(),
            Err(RaveError::MissingParameter(name)) if name == "amount"
        ));

        assert!(master_card().validate().is_ok());
    }

    #[test]
    fn debug_masks_card_secrets() {
        let card = master_card().with_pin("3310");
        let debug = format!("{card:?}");
        assert!(debug.contains("************0229"));
        assert!(!debug.contains("5438898014560229"));
        assert!(!debug.contains("3310"));
        assert!(!debug.contains("789"));
    }

    #[test]
    fn xrequery_requires_a_reference() {
        assert!(XrequeryVerification::default().validate().is_err());
        assert!(XrequeryVerification::by_tx_ref("abcdef").validate().is_ok());
        assert!(XrequeryVerification::by_flw_ref("FLW-1").validate().is_ok());
    }

    #[test]
    fn payment_page_order_is_byte_order_of_field_names() {
        let mut sorted = PaymentPageRequest::CANONICAL_ORDER.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, PaymentPageRequest::CANONICAL_ORDER);
    }

    #[test]
    fn payment_page_hash_matches_sorted_generation() {
        let page = PaymentPageRequest {
            public_key: "FLWPUBK-x-X".into(),
            amount: 100.into(),
            country: "NG".into(),
            currency: "NGN".into(),
            custom_description: "d".into(),
            custom_logo: "l".into(),
            custom_title: "t".into(),
            customer_email: "e@example.com".into(),
            customer_firstname: "f".into(),
            customer_lastname: "l".into(),
            customer_phone: "p".into(),
            payment_method: "card".into(),
            txref: "ref".into(),
        };
        let generator = ChecksumGenerator::new("FLWSECK-y-X").unwrap();
        assert_eq!(
            page.integrity_hash(&generator).unwrap(),
            generator.generate_sorted(&page.integrity_params()).unwrap()
        );
    }
}
