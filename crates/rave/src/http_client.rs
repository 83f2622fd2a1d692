use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::checksum::{ChecksumGenerator, IntegrityFields};
use crate::cipher::{CardCipher, ALGORITHM};
use crate::config::RaveConfig;
use crate::constants::{
    BANKS_ENDPOINT, CHARGE_ENDPOINT, FEES_ENDPOINT, SUGGESTED_AUTH_PIN, VALIDATE_CHARGE_ENDPOINT,
    VERIFY_ENDPOINT, XREQUERY_ENDPOINT,
};
use crate::payment::{
    CardCharge, FeeQuery, PaymentPageRequest, ValidateCharge, VerifyTransaction,
    XrequeryVerification,
};
use crate::response::{
    ApiResponse, Bank, ChargeData, FeeData, TransactionData, ValidateData, XrequeryData,
};
use crate::RaveError;

/// Async client for the Rave card payment endpoints.
///
/// Holds the derived 3DES key and the checksum secret for its whole lifetime;
/// both come from the [`RaveConfig`] given at construction.
pub struct RaveClient {
    http: reqwest::Client,
    config: RaveConfig,
    cipher: CardCipher,
    checksum: ChecksumGenerator,
}

impl RaveClient {
    pub fn new(config: RaveConfig) -> Result<Self, RaveError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| RaveError::Http(format!("failed to build HTTP client: {e}")))?;
        Self::with_http_client(config, http)
    }

    /// Create a client with a custom reqwest::Client.
    pub fn with_http_client(config: RaveConfig, http: reqwest::Client) -> Result<Self, RaveError> {
        let cipher = CardCipher::new(&config.secret_key)?;
        let checksum = ChecksumGenerator::new(config.secret_key.clone())?;
        Ok(Self {
            http,
            config,
            cipher,
            checksum,
        })
    }

    pub fn config(&self) -> &RaveConfig {
        &self.config
    }

    pub fn cipher(&self) -> &CardCipher {
        &self.cipher
    }

    pub fn checksum(&self) -> &ChecksumGenerator {
        &self.checksum
    }

    /// Encrypt a plaintext payload the way card charges are encrypted.
    pub fn encrypt_3des(&self, plaintext: &str) -> Result<String, RaveError> {
        Ok(self.cipher.encrypt(plaintext)?)
    }

    /// `integrity_hash` for a hosted payment page request.
    pub fn integrity_hash(&self, request: &PaymentPageRequest) -> Result<String, RaveError> {
        Ok(request.integrity_hash(&self.checksum)?)
    }

    /// Charge a card.
    ///
    /// When the processor answers with `suggested_auth = "PIN"` and the caller
    /// did not pick an auth model, the charge is re-submitted once with the
    /// card PIN, which must then be present. Card fields are checked by the
    /// processor; its rejection comes back as [`RaveError::Api`].
    pub async fn charge_card(&self, card: &CardCharge) -> Result<ApiResponse<ChargeData>, RaveError> {
        let mut payload = card.clone();
        payload.public_key = self.config.require_public_key()?.to_string();

        let resp = self.submit_charge(&payload).await?;

        let suggested = resp.data.as_ref().and_then(|d| d.suggested_auth.clone());
        match suggested {
            Some(auth) if payload.suggested_auth.is_none() => {
                if !auth.eq_ignore_ascii_case(SUGGESTED_AUTH_PIN) {
                    tracing::debug!(tx_ref = %card.tx_ref, suggested_auth = %auth, "charge needs caller-side auth");
                    return Ok(resp);
                }
                if payload.pin.as_deref().map_or(true, str::is_empty) {
                    return Err(RaveError::MissingParameter("pin".to_string()));
                }
                tracing::debug!(tx_ref = %card.tx_ref, "re-submitting charge with PIN auth");
                payload.suggested_auth = Some(SUGGESTED_AUTH_PIN.to_string());
                self.submit_charge(&payload).await
            }
            _ => Ok(resp),
        }
    }

    async fn submit_charge(&self, payload: &CardCharge) -> Result<ApiResponse<ChargeData>, RaveError> {
        let plaintext = serde_json::to_string(payload)?;
        let client = self.cipher.encrypt(&plaintext)?;
        let body = json!({
            "PBFPubKey": payload.public_key,
            "client": client,
            "alg": ALGORITHM,
        });
        self.post(CHARGE_ENDPOINT, &body).await
    }

    /// Complete a pending charge with the OTP the customer received.
    pub async fn validate_charge(
        &self,
        request: &ValidateCharge,
    ) -> Result<ApiResponse<ValidateData>, RaveError> {
        if request.transaction_reference.is_empty() {
            return Err(RaveError::MissingParameter("transaction_reference".to_string()));
        }
        if request.otp.is_empty() {
            return Err(RaveError::MissingParameter("otp".to_string()));
        }
        let body = json!({
            "PBFPubKey": self.config.require_public_key()?,
            "transaction_reference": request.transaction_reference,
            "otp": request.otp,
        });
        self.post(VALIDATE_CHARGE_ENDPOINT, &body).await
    }

    /// Look up a transaction by processor reference.
    pub async fn verify_transaction(
        &self,
        request: &VerifyTransaction,
    ) -> Result<ApiResponse<TransactionData>, RaveError> {
        if request.flw_ref.is_empty() {
            return Err(RaveError::MissingParameter("flw_ref".to_string()));
        }
        let body = json!({
            "flw_ref": request.flw_ref,
            "SECKEY": self.config.secret_key,
            "normalize": flag(request.normalize),
        });
        self.post(VERIFY_ENDPOINT, &body).await
    }

    /// Look up a transaction through xrequery, by merchant or processor reference.
    pub async fn xrequery_transaction_verification(
        &self,
        request: &XrequeryVerification,
    ) -> Result<ApiResponse<XrequeryData>, RaveError> {
        request.validate()?;
        let mut body = json!({
            "SECKEY": self.config.secret_key,
            "last_attempt": flag(request.last_attempt),
            "only_attempt": flag(request.only_attempt),
        });
        if let Some(flw_ref) = &request.flw_ref {
            body["flw_ref"] = Value::from(flw_ref.as_str());
        }
        if let Some(tx_ref) = &request.tx_ref {
            body["tx_ref"] = Value::from(tx_ref.as_str());
        }
        self.post(XREQUERY_ENDPOINT, &body).await
    }

    /// Banks that can be charged directly.
    pub async fn list_banks(&self) -> Result<Vec<Bank>, RaveError> {
        let url = self.url(BANKS_ENDPOINT);
        tracing::debug!(%url, "listing banks");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RaveError::Http(format!("request failed: {e}")))?;

        let value = Self::checked_body(&url, resp).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fee the processor will add for an amount.
    pub async fn get_fees(&self, query: &FeeQuery) -> Result<ApiResponse<FeeData>, RaveError> {
        if query.currency.is_empty() {
            return Err(RaveError::MissingParameter("currency".to_string()));
        }
        let mut body = serde_json::to_value(query)?;
        body["PBFPubKey"] = Value::from(self.config.require_public_key()?);
        self.post(FEES_ENDPOINT, &body).await
    }

    /// POST a JSON body and decode the standard response envelope.
    ///
    /// Non-2xx statuses and `"status": "error"` bodies become [`RaveError::Api`].
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<ApiResponse<T>, RaveError> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "sending request");

        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| RaveError::Http(format!("request failed: {e}")))?;

        let value = Self::checked_body(&url, resp).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Read a response body as JSON.
    ///
    /// Non-2xx statuses and `"status": "error"` bodies become [`RaveError::Api`].
    async fn checked_body(url: &str, resp: reqwest::Response) -> Result<Value, RaveError> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RaveError::Http(format!("failed to read response: {e}")))?;

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                RaveError::Http(format!("response parse failed: {e}"))
            } else {
                api_error(status.as_u16(), &text)
            }
        })?;

        let is_error_body = value
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| s.eq_ignore_ascii_case("error"));

        if !status.is_success() || is_error_body {
            let err = api_error(status.as_u16(), &text);
            tracing::warn!(%url, status = status.as_u16(), "request rejected");
            return Err(err);
        }

        tracing::info!(%url, status = status.as_u16(), "request succeeded");
        Ok(value)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url().trim_end_matches('/'), endpoint)
    }
}

fn flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

/// Build an [`RaveError::Api`] from a response body, preferring its `message`.
fn api_error(status: u16, body: &str) -> RaveError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    RaveError::Api { message, status }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_prefers_message_field() {
        let err = api_error(400, r#"{"status":"error","message":"cvv is required","data":null}"#);
        assert_eq!(err.to_string(), "cvv is required Status Code: 400");
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let err = api_error(502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "Bad Gateway Status Code: 502");
    }

    #[test]
    fn client_rejects_unusable_secret() {
        let err = RaveClient::new(RaveConfig::new("FLWSECK-short", "pk")).err();
        assert!(matches!(err, Some(RaveError::Encryption(_))));
    }

    #[test]
    fn url_joins_base_and_endpoint() {
        let client = RaveClient::new(
            RaveConfig::new("FLWSECK-bb971402072265fb156e90a3578fe5e6-X", "pk")
                .with_base_url("http://localhost:8080/"),
        )
        .unwrap();
        assert_eq!(
            client.url(VERIFY_ENDPOINT),
            "http://localhost:8080/flwv3-pug/getpaidx/api/verify"
        );
    }
}
