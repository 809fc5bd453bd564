use std::env;

use crate::error::{GencliError, Result};

const DEFAULT_API_KEY_VAR: &str = "GEMINI_API_KEY";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings taken from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key_var: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub(crate) fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let api_key_var = parse_non_empty(get_var("GENCLI_API_KEY_VAR").as_deref())
            .unwrap_or_else(|| DEFAULT_API_KEY_VAR.to_string());
        let api_key = parse_non_empty(get_var(&api_key_var).as_deref());
        let base_url = parse_non_empty(get_var("GENCLI_BASE_URL").as_deref())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = parse_timeout_secs(get_var("GENCLI_TIMEOUT_SECS").as_deref());

        Self {
            api_key_var,
            api_key,
            base_url,
            timeout_secs,
        }
    }

    /// Returns the credential, or the guidance error when it is unset or blank.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| GencliError::MissingCredential {
                var: self.api_key_var.clone(),
            })
    }
}

fn parse_non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    parse_positive_u64(raw, DEFAULT_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{
        DEFAULT_API_KEY_VAR, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, Settings, parse_non_empty,
        parse_timeout_secs,
    };
    use crate::error::GencliError;

    fn settings_from_pairs(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        Settings::from_env_with(|key| vars.get(key).cloned())
    }

    #[test]
    fn from_env_uses_defaults_when_vars_are_missing() {
        let settings = settings_from_pairs(&[]);
        assert_eq!(settings.api_key_var, DEFAULT_API_KEY_VAR);
        assert_eq!(settings.api_key, None);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn from_env_reads_configured_values() {
        let settings = settings_from_pairs(&[
            ("GEMINI_API_KEY", "secret"),
            ("GENCLI_BASE_URL", "http://localhost:9999"),
            ("GENCLI_TIMEOUT_SECS", "12"),
        ]);

        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.base_url, "http://localhost:9999");
        assert_eq!(settings.timeout_secs, 12);
    }

    #[test]
    fn from_env_reads_credential_from_renamed_variable() {
        let settings = settings_from_pairs(&[
            ("GENCLI_API_KEY_VAR", "GOOGLE_API_KEY"),
            ("GOOGLE_API_KEY", "other-secret"),
            ("GEMINI_API_KEY", "ignored"),
        ]);

        assert_eq!(settings.api_key_var, "GOOGLE_API_KEY");
        assert_eq!(settings.api_key.as_deref(), Some("other-secret"));
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let settings = settings_from_pairs(&[("GEMINI_API_KEY", "   ")]);
        assert_eq!(settings.api_key, None);

        let err = settings
            .require_api_key()
            .expect_err("blank credential should be rejected");
        assert!(matches!(err, GencliError::MissingCredential { ref var } if var == "GEMINI_API_KEY"));
    }

    #[test]
    fn require_api_key_returns_present_credential() {
        let settings = settings_from_pairs(&[("GEMINI_API_KEY", "secret")]);
        assert_eq!(
            settings.require_api_key().expect("credential should be set"),
            "secret"
        );
    }

    #[test]
    fn parse_timeout_secs_uses_default_for_missing_or_invalid_values() {
        assert_eq!(parse_timeout_secs(None), DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse_timeout_secs(Some("")), DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse_timeout_secs(Some("soon")), DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse_timeout_secs(Some("0")), DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse_timeout_secs(Some("  45 ")), 45);
    }

    #[test]
    fn parse_non_empty_trims_and_filters() {
        assert_eq!(parse_non_empty(None), None);
        assert_eq!(parse_non_empty(Some("  ")), None);
        assert_eq!(parse_non_empty(Some(" value ")).as_deref(), Some("value"));
    }
}
