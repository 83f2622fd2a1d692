//! Response bodies returned by the API.
//!
//! The processor is inconsistent about key casing (`flwRef`, `flwref`,
//! `flw_ref`) and about whether amounts are numbers or strings, so the typed
//! views accept every spelling and keep the rest of the payload in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::RaveError;

/// Envelope shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// `data` of a charge response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeData {
    /// Set when the processor wants another authentication step (e.g. `PIN`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_auth: Option<String>,
    #[serde(rename = "flwRef", alias = "flw_ref", default, skip_serializing_if = "Option::is_none")]
    pub flw_ref: Option<String>,
    #[serde(rename = "txRef", alias = "tx_ref", default, skip_serializing_if = "Option::is_none")]
    pub tx_ref: Option<String>,
    #[serde(rename = "authModelUsed", default, skip_serializing_if = "Option::is_none")]
    pub auth_model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authurl: Option<String>,
    #[serde(rename = "chargeResponseCode", default, skip_serializing_if = "Option::is_none")]
    pub charge_response_code: Option<String>,
    #[serde(rename = "chargeResponseMessage", default, skip_serializing_if = "Option::is_none")]
    pub charge_response_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub charged_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChargeData {
    /// Whether the charge is waiting for an OTP (`chargeResponseCode == "02"`).
    pub fn needs_validation(&self) -> bool {
        self.charge_response_code.as_deref() == Some("02")
    }
}

/// `data` of a validate-charge response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<ChargeData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A transaction as reported by the verify and xrequery endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionData {
    #[serde(alias = "txref", alias = "txRef", default, skip_serializing_if = "Option::is_none")]
    pub tx_ref: Option<String>,
    #[serde(alias = "flwref", alias = "flwRef", default, skip_serializing_if = "Option::is_none")]
    pub flw_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(
        alias = "chargedamount",
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub charged_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        alias = "chargecode",
        alias = "chargeResponseCode",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub charge_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The xrequery endpoint returns either one attempt or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XrequeryData {
    Many(Vec<TransactionData>),
    One(TransactionData),
}

impl XrequeryData {
    /// The most recent attempt; the API lists attempts oldest first.
    pub fn latest(&self) -> Option<&TransactionData> {
        match self {
            XrequeryData::Many(all) => all.last(),
            XrequeryData::One(one) => Some(one),
        }
    }
}

/// One entry of the bank list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub bankname: String,
    pub bankcode: String,
    #[serde(default)]
    pub internetbanking: bool,
}

/// `data` of a fee quote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeData {
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub charge_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub merchantfee: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
    pub ravefee: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What the merchant expects a successful transaction to look like.
///
/// Run against the verify response before giving value to the customer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCheck {
    pub amount: f64,
    pub currency: String,
}

impl TransactionCheck {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Confirm status, charge code, currency and amount.
    ///
    /// The charged amount may exceed the expected amount when fees are passed
    /// to the customer; it must never be lower.
    pub fn confirm(&self, tx: &TransactionData) -> Result<(), RaveError> {
        let status = tx.status.as_deref().unwrap_or_default();
        if !(status.eq_ignore_ascii_case("successful") || status.eq_ignore_ascii_case("success")) {
            return Err(RaveError::Verification(format!(
                "transaction status is {status:?}"
            )));
        }

        match tx.charge_code.as_deref() {
            Some("00") | Some("0") => {}
            other => {
                return Err(RaveError::Verification(format!(
                    "unexpected charge code {other:?}"
                )))
            }
        }

        let currency = tx.currency.as_deref().unwrap_or_default();
        if !currency.eq_ignore_ascii_case(&self.currency) {
            return Err(RaveError::Verification(format!(
                "currency {currency:?} does not match expected {:?}",
                self.currency
            )));
        }

        let charged = tx.charged_amount.or(tx.amount).unwrap_or_default();
        if charged < self.amount {
            return Err(RaveError::Verification(format!(
                "charged amount {charged} is below expected {}",
                self.amount
            )));
        }
        Ok(())
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
