use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use phonenumber::country;

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// GatewayAPI OAuth consumer key.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    /// Name used in validation errors.
    pub const FIELD: &'static str = "key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// GatewayAPI OAuth consumer secret.
///
/// Invariant: non-empty after trimming. The value is only ever used as HMAC key
/// material and is redacted from `Debug` output.
pub struct ApiSecret(String);

impl ApiSecret {
    /// Name used in validation errors.
    pub const FIELD: &'static str = "secret";

    /// Create a validated [`ApiSecret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecret(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient number as sent to GatewayAPI (`msisdn`).
///
/// Invariant: ASCII digits only, country code included, no leading `+`.
/// Use [`PhoneNumber`] and convert it into [`Msisdn`] for normalization of
/// human-formatted input.
pub struct Msisdn(String);

impl Msisdn {
    /// JSON field name used by GatewayAPI (`msisdn`).
    pub const FIELD: &'static str = "msisdn";

    /// Create a validated msisdn.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidMsisdn {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Digits as sent to GatewayAPI.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PhoneNumber> for Msisdn {
    /// E.164 form without the leading `+`.
    fn from(value: PhoneNumber) -> Self {
        Self(value.e164.trim_start_matches('+').to_owned())
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// Name used in validation errors.
    pub const FIELD: &'static str = "msisdn";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`message`), always UTF-8; the service transcodes it
/// according to the requested encoding.
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// JSON field name used by GatewayAPI (`message`).
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Binary SMS content (`payload`) with an optional user data header (`udh`).
///
/// Both parts are base64 text, validated on construction and sent verbatim.
pub struct Payload {
    data: String,
    udh: Option<String>,
}

impl Payload {
    /// JSON field name used by GatewayAPI (`payload`).
    pub const FIELD: &'static str = "payload";
    /// JSON field name used by GatewayAPI (`udh`).
    pub const UDH_FIELD: &'static str = "udh";

    /// Create a payload from base64 text.
    pub fn new(base64: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            data: validate_base64(Self::FIELD, base64.into())?,
            udh: None,
        })
    }

    /// Attach a base64 encoded user data header.
    pub fn with_udh(mut self, base64: impl Into<String>) -> Result<Self, ValidationError> {
        self.udh = Some(validate_base64(Self::UDH_FIELD, base64.into())?);
        Ok(self)
    }

    /// Encode raw bytes as a payload.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, ValidationError> {
        Self::new(BASE64.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn udh(&self) -> Option<&str> {
        self.udh.as_deref()
    }
}

fn validate_base64(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    BASE64
        .decode(trimmed)
        .map_err(|_| ValidationError::InvalidBase64 { field })?;
    Ok(trimmed.to_owned())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender shown on the handset (`sender`).
///
/// Invariant: non-empty after trimming; up to 11 characters, or up to 15 when
/// the sender is numeric.
pub struct SenderId(String);

impl SenderId {
    /// JSON field name used by GatewayAPI (`sender`).
    pub const FIELD: &'static str = "sender";

    pub const MAX_ALPHANUMERIC: usize = 11;
    pub const MAX_NUMERIC: usize = 15;

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let max = if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Self::MAX_NUMERIC
        } else {
            Self::MAX_ALPHANUMERIC
        };
        let actual = trimmed.chars().count();
        if actual > max {
            return Err(ValidationError::TooLong {
                field: Self::FIELD,
                max,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Status notification URL (`callback_url`).
///
/// Invariant: an absolute URL.
pub struct CallbackUrl(url::Url);

impl CallbackUrl {
    /// JSON field name used by GatewayAPI (`callback_url`).
    ///
    /// Some older clients sent `callbackUrl`; the REST API documents the snake_case name.
    pub const FIELD: &'static str = "callback_url";

    /// Parse and validate a callback URL.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let url = url::Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl {
            field: Self::FIELD,
            input: trimmed.to_owned(),
        })?;
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Unix timestamp in seconds (`sendtime`), used for scheduled sends.
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// JSON field name used by GatewayAPI (`sendtime`).
    pub const FIELD: &'static str = "sendtime";

    /// Create a timestamp value (no range validation is performed).
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the underlying timestamp in seconds.
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Delivery window in seconds (`validity_period`).
///
/// The value is sent as given. GatewayAPI raises any non-zero value below
/// [`ValidityPeriod::SERVICE_MINIMUM_SECS`] to that minimum; zero means "not
/// set" and is omitted from the request.
pub struct ValidityPeriod(u32);

impl ValidityPeriod {
    /// JSON field name used by GatewayAPI (`validity_period`).
    pub const FIELD: &'static str = "validity_period";

    /// Smallest window the service applies.
    pub const SERVICE_MINIMUM_SECS: u32 = 60;

    pub fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> u32 {
        self.0
    }

    /// Window the service will actually apply, or `None` when unset.
    pub fn service_effective_secs(self) -> Option<u32> {
        (self.0 != 0).then(|| self.0.max(Self::SERVICE_MINIMUM_SECS))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Upper bound on the number of SMS parts one message may be split into (`max_parts`).
///
/// Invariant: `1..=255`.
pub struct MaxParts(u8);

impl MaxParts {
    /// JSON field name used by GatewayAPI (`max_parts`).
    pub const FIELD: &'static str = "max_parts";

    pub const MIN: u8 = 1;
    pub const MAX: u8 = u8::MAX;

    /// Create a validated part limit.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value < Self::MIN {
            return Err(ValidationError::OutOfRange {
                field: Self::FIELD,
                min: u32::from(Self::MIN),
                max: u32::from(Self::MAX),
                actual: u32::from(value),
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}
