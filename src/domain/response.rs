use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct MtSmsResponse {
    /// One message id per recipient, in request order.
    pub ids: Vec<u64>,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Usage {
    /// Message count per ISO 3166-1 alpha-2 country code.
    pub countries: BTreeMap<String, u64>,
    pub currency: String,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Structured error body returned by GatewayAPI for unclassified failures.
pub struct ServiceError {
    pub code: Option<String>,
    /// Correlation id to quote when contacting GatewayAPI support.
    pub incident_uuid: Option<String>,
    /// Message template with positional `%0`, `%1`, ... placeholders.
    pub message: String,
    pub variables: Vec<String>,
}

impl ServiceError {
    /// Human-readable message: `code: {code}; ` (when a code is present) followed by
    /// the template with each `%i` replaced by `variables[i]`.
    ///
    /// Only the first occurrence of each placeholder is replaced, in variable order.
    pub fn render(&self) -> String {
        let mut msg = match self.code.as_deref() {
            Some(code) if !code.is_empty() => format!("code: {code}; {}", self.message),
            _ => self.message.clone(),
        };
        for (idx, value) in self.variables.iter().enumerate() {
            msg = msg.replacen(&format!("%{idx}"), value, 1);
        }
        msg
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
