/// Sandbox API host.
pub const SANDBOX_BASE_URL: &str = "https://ravesandboxapi.flutterwave.com";

/// Live API host.
pub const LIVE_BASE_URL: &str = "https://api.ravepay.co";

/// Path prefix shared by the card payment endpoints.
pub const API_PREFIX: &str = "/flwv3-pug/getpaidx/api";

pub const CHARGE_ENDPOINT: &str = "/flwv3-pug/getpaidx/api/charge";
pub const VALIDATE_CHARGE_ENDPOINT: &str = "/flwv3-pug/getpaidx/api/validatecharge";
pub const VERIFY_ENDPOINT: &str = "/flwv3-pug/getpaidx/api/verify";
pub const XREQUERY_ENDPOINT: &str = "/flwv3-pug/getpaidx/api/xrequery";
pub const BANKS_ENDPOINT: &str = "/flwv3-pug/getpaidx/api/flwpbf-banks.js?json=1";
pub const FEES_ENDPOINT: &str = "/flwv3-pug/getpaidx/api/fee";

/// Request timeout used when `RAVE_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// `suggested_auth` value that asks for the card PIN.
pub const SUGGESTED_AUTH_PIN: &str = "PIN";

/// Which Rave deployment requests go to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Sandbox,
    Live,
}

impl Environment {
    pub fn from_live_flag(live: bool) -> Self {
        if live {
            Environment::Live
        } else {
            Environment::Sandbox
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Live => LIVE_BASE_URL,
        }
    }

    pub fn is_live(self) -> bool {
        self == Environment::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_share_the_api_prefix() {
        for endpoint in [
            CHARGE_ENDPOINT,
            VALIDATE_CHARGE_ENDPOINT,
            VERIFY_ENDPOINT,
            XREQUERY_ENDPOINT,
            BANKS_ENDPOINT,
            FEES_ENDPOINT,
        ] {
            assert!(endpoint.starts_with(API_PREFIX), "{endpoint}");
        }
    }

    #[test]
    fn live_flag_selects_host() {
        assert_eq!(Environment::from_live_flag(false).base_url(), SANDBOX_BASE_URL);
        assert_eq!(Environment::from_live_flag(true).base_url(), LIVE_BASE_URL);
        assert!(!Environment::default().is_live());
    }
}
