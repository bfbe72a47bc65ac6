use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    TooManyRecipients {
        max: usize,
        actual: usize,
    },
    DuplicateRecipient {
        msisdn: String,
    },
    InvalidPhoneNumber {
        input: String,
    },
    InvalidMsisdn {
        input: String,
    },
    InvalidBase64 {
        field: &'static str,
    },
    InvalidUrl {
        field: &'static str,
        input: String,
    },
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        actual: u32,
    },
    MessageWithPayload,
    TagsWithPayload,
    MaxPartsWithPayload,
    MaxPartsWithTags,
    TagValuesWithoutTags {
        msisdn: String,
    },
    TagValueCountMismatch {
        msisdn: String,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::TooManyRecipients { max, actual } => {
                write!(f, "too many recipients: {actual} (max {max})")
            }
            Self::DuplicateRecipient { msisdn } => write!(f, "duplicate recipient: {msisdn}"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidMsisdn { input } => {
                write!(f, "invalid msisdn: {input} (expected digits only)")
            }
            Self::InvalidBase64 { field } => write!(f, "{field} must be valid base64"),
            Self::InvalidUrl { field, input } => write!(f, "{field} is not a valid URL: {input}"),
            Self::TooLong { field, max, actual } => {
                write!(f, "{field} is too long: {actual} characters (max {max})")
            }
            Self::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(
                f,
                "{field} out of range: {actual} (expected {min}..={max})"
            ),
            Self::MessageWithPayload => write!(f, "message and payload are mutually exclusive"),
            Self::TagsWithPayload => write!(f, "tags cannot be used with a binary payload"),
            Self::MaxPartsWithPayload => {
                write!(f, "max_parts cannot be used with a binary payload")
            }
            Self::MaxPartsWithTags => write!(f, "max_parts cannot be used with tags"),
            Self::TagValuesWithoutTags { msisdn } => {
                write!(f, "recipient {msisdn} has tag values but the message has no tags")
            }
            Self::TagValueCountMismatch {
                msisdn,
                expected,
                actual,
            } => write!(
                f,
                "recipient {msisdn} has {actual} tag values (expected {expected})"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
