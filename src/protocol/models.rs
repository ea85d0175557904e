//! Gateway callback and response models.

use crate::crypto::canonical::canonicalize;
use crate::SberpayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Callback field carrying the hex checksum.
pub const CHECKSUM_FIELD: &str = "checksum";

/// Callback field naming the key the gateway signed with.
pub const SIGN_ALIAS_FIELD: &str = "sign_alias";

/// Operation reported by a gateway callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOperation {
    /// Funds were put on hold (two-stage payment).
    Approved,
    /// Order was declined because the payment window elapsed.
    DeclinedByTimeout,
    /// Funds were captured.
    Deposited,
    /// Hold was released.
    Reversed,
    /// Captured funds were returned.
    Refunded,
    /// Operation this client does not know about.
    Other(String),
}

impl CallbackOperation {
    /// Parse the `operation` callback field.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "approved" => Self::Approved,
            "declinedByTimeout" => Self::DeclinedByTimeout,
            "deposited" => Self::Deposited,
            "reversed" => Self::Reversed,
            "refunded" => Self::Refunded,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire name of the operation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "approved",
            Self::DeclinedByTimeout => "declinedByTimeout",
            Self::Deposited => "deposited",
            Self::Reversed => "reversed",
            Self::Refunded => "refunded",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for CallbackOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat key/value callback delivered by the gateway.
///
/// Field order is irrelevant; the signed form is produced by
/// [`CallbackPayload::canonical_string`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackPayload {
    fields: BTreeMap<String, String>,
}

impl CallbackPayload {
    /// Build a payload from key/value pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Decode a URL query string such as
    /// `mdOrder=6d7dd3386fe&operation=deposited&checksum=AB12`.
    ///
    /// A leading `?` is ignored.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()).into_owned())
    }

    /// Parse a JSON object callback body. Scalar values are stringified.
    pub fn from_json(body: &[u8]) -> Result<Self, SberpayError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SberpayError::ProtocolError(format!("Invalid callback JSON: {}", e)))?;

        let Value::Object(map) = value else {
            return Err(SberpayError::ProtocolError(
                "Callback body must be a JSON object".to_string(),
            ));
        };

        let mut fields = BTreeMap::new();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                other => {
                    return Err(SberpayError::ProtocolError(format!(
                        "Callback field '{}' is not a scalar: {}",
                        key, other
                    )))
                }
            };
            fields.insert(key, text);
        }
        Ok(Self { fields })
    }

    /// Raw field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// All fields in key order.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Hex checksum supplied by the gateway.
    pub fn checksum(&self) -> Option<&str> {
        self.get(CHECKSUM_FIELD)
    }

    /// Alias of the gateway signing key.
    pub fn sign_alias(&self) -> Option<&str> {
        self.get(SIGN_ALIAS_FIELD)
    }

    /// Gateway order id.
    pub fn md_order(&self) -> Option<&str> {
        self.get("mdOrder")
    }

    /// Merchant order number.
    pub fn order_number(&self) -> Option<&str> {
        self.get("orderNumber")
    }

    /// Reported operation.
    pub fn operation(&self) -> Option<CallbackOperation> {
        self.get("operation").map(CallbackOperation::parse)
    }

    /// Whether the operation succeeded (`status=1`).
    pub fn is_successful(&self) -> bool {
        self.get("status") == Some("1")
    }

    /// The string the gateway signed for this callback.
    pub fn canonical_string(&self) -> String {
        canonicalize(&self.fields)
    }
}

/// Success or failure of a gateway response, judged by `errorCode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// `errorCode` is `"0"` or absent.
    Success,
    /// Any other `errorCode`.
    Failure {
        /// The reported error code.
        code: String,
        /// The reported `errorMessage`, if any.
        message: Option<String>,
    },
}

impl GatewayOutcome {
    /// Classify a parsed gateway response body.
    ///
    /// The gateway omits `errorCode` on success, so a missing code counts as
    /// `"0"`. Numeric codes are compared by their decimal text.
    pub fn from_response(response: &Value) -> Self {
        let code = match response.get("errorCode") {
            None | Some(Value::Null) => return Self::Success,
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        if code == "0" {
            return Self::Success;
        }

        let message = response.get("errorMessage").map(|m| match m {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        Self::Failure { code, message }
    }

    /// Whether this is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Typed view over a `register.do` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrderResponse {
    /// Gateway order id (the callback's `mdOrder`).
    #[serde(default)]
    pub order_id: Option<String>,

    /// Payment page URL to redirect the customer to.
    #[serde(default)]
    pub form_url: Option<String>,

    /// Error code (absent or `"0"` on success).
    #[serde(default, deserialize_with = "deserialize_code")]
    pub error_code: Option<String>,

    /// Human-readable error description.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl RegisterOrderResponse {
    /// Build the typed view from a raw response body.
    pub fn from_value(value: &Value) -> Result<Self, SberpayError> {
        Self::deserialize(value)
            .map_err(|e| SberpayError::ProtocolError(format!("Unexpected register response: {}", e)))
    }

    /// Whether the registration succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.error_code.as_deref(), None | Some("0"))
    }
}

fn deserialize_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
