//! Provider payloads emitted by `codexbar usage --format json`
//!
//! Parsing is deliberately forgiving: a field with an unexpected type is
//! treated as absent instead of rejecting the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::provider::provider_title;
use super::usage_window::UsageWindow;

/// Deserialize a field, mapping any type mismatch to `None`
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Usage block of a provider record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub primary: Option<UsageWindow>,

    #[serde(default, deserialize_with = "lenient")]
    pub secondary: Option<UsageWindow>,

    #[serde(default, deserialize_with = "lenient")]
    pub account_email: Option<String>,
}

/// Credits block of a provider record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreditsBlock {
    #[serde(default, deserialize_with = "lenient")]
    pub remaining: Option<f64>,
}

/// Error attached to a provider record
///
/// The tool reports either `{"message": "..."}` or a bare string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PayloadError {
    Message(String),
    Detailed {
        #[serde(default, deserialize_with = "lenient")]
        message: Option<String>,
    },
}

impl PayloadError {
    pub fn message(&self) -> &str {
        match self {
            PayloadError::Message(msg) => msg,
            PayloadError::Detailed { message } => message.as_deref().unwrap_or("unknown"),
        }
    }
}

/// One provider entry of the usage JSON array
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub provider: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<UsageBlock>,

    #[serde(default, deserialize_with = "lenient")]
    pub credits: Option<CreditsBlock>,

    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<PayloadError>,
}

impl ProviderPayload {
    /// Provider id as reported, `"unknown"` when missing
    pub fn provider_id(&self) -> &str {
        self.provider.as_deref().unwrap_or("unknown")
    }

    /// Display name for the provider
    pub fn title(&self) -> String {
        provider_title(self.provider_id())
    }

    /// Error message when the provider failed
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(PayloadError::message)
    }

    /// Session (primary) window, empty when missing
    pub fn session(&self) -> UsageWindow {
        self.usage
            .as_ref()
            .and_then(|u| u.primary.clone())
            .unwrap_or_default()
    }

    /// Weekly (secondary) window, empty when missing
    pub fn weekly(&self) -> UsageWindow {
        self.usage
            .as_ref()
            .and_then(|u| u.secondary.clone())
            .unwrap_or_default()
    }

    /// Remaining credits when reported as a finite number
    pub fn credits_remaining(&self) -> Option<f64> {
        self.credits
            .as_ref()
            .and_then(|c| c.remaining)
            .filter(|r| r.is_finite())
    }

    /// Account email when present and non-empty
    pub fn account_email(&self) -> Option<&str> {
        self.usage
            .as_ref()
            .and_then(|u| u.account_email.as_deref())
            .filter(|e| !e.is_empty())
    }

    /// Case-insensitive match against id, display name, and account email
    ///
    /// `query` is expected to be trimmed and lowercased already.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {}",
            self.provider_id(),
            self.title().to_lowercase(),
            self.account_email().unwrap_or_default().to_lowercase()
        );
        haystack.contains(query)
    }
}

/// Parse the usage JSON document
///
/// Returns `None` when the text is not JSON or the top level is not an array.
/// Array elements that are not objects are dropped.
pub fn parse_payloads(text: &str) -> Option<Vec<ProviderPayload>> {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Usage output is not JSON: {}", e);
            return None;
        }
    };

    let Value::Array(items) = value else {
        tracing::debug!("Usage output is not a JSON array");
        return None;
    };

    Some(
        items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
    )
}

/// Filter payloads with a raw search query
pub fn filter_payloads<'a>(payloads: &'a [ProviderPayload], query: &str) -> Vec<&'a ProviderPayload> {
    let query = query.trim().to_lowercase();
    payloads.iter().filter(|p| p.matches(&query)).collect()
}
