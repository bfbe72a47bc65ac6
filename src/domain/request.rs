use std::collections::HashSet;

use crate::domain::validation::ValidationError;
use crate::domain::value::{
    CallbackUrl, MaxParts, MessageText, Msisdn, Payload, SenderId, UnixTimestamp, ValidityPeriod,
};

pub const SMS_MAX_RECIPIENTS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Message class (`class`). The secret class blurs message content and is
/// priced and routed as premium.
pub enum SmsClass {
    /// Sent as `"standard"`. Some older clients sent `"default"` for this class.
    Standard,
    Premium,
    Secret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Delivery priority (`priority`). `VeryUrgent` requires the premium class.
pub enum Priority {
    Bulk,
    Normal,
    Urgent,
    VeryUrgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Transcoding applied by the service (`encoding`). `Utf8` means GSM 03.38.
pub enum Encoding {
    Utf8,
    Ucs2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Destination address mode (`destaddr`). `Display` sends a "flash SMS".
pub enum DestinationAddress {
    Display,
    Mobile,
    SimCard,
    ExtUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Extra response detail (`extra_details`).
pub enum ExtraDetails {
    RecipientsUsage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    msisdn: Msisdn,
    tag_values: Vec<String>,
}

impl Recipient {
    pub fn new(msisdn: Msisdn) -> Self {
        Self {
            msisdn,
            tag_values: Vec::new(),
        }
    }

    /// Values replacing [`SmsOptions::tags`] in order for this recipient.
    pub fn with_tag_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn msisdn(&self) -> &Msisdn {
        &self.msisdn
    }

    pub fn tag_values(&self) -> &[String] {
        &self.tag_values
    }
}

impl From<Msisdn> for Recipient {
    fn from(msisdn: Msisdn) -> Self {
        Self::new(msisdn)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SmsOptions {
    pub class: Option<SmsClass>,
    pub sender: Option<SenderId>,
    pub sendtime: Option<UnixTimestamp>,
    pub tags: Option<Vec<String>>,
    pub userref: Option<String>,
    pub priority: Option<Priority>,
    pub validity_period: Option<ValidityPeriod>,
    pub encoding: Option<Encoding>,
    pub destaddr: Option<DestinationAddress>,
    pub callback_url: Option<CallbackUrl>,
    pub label: Option<String>,
    pub max_parts: Option<MaxParts>,
    pub extra_details: Option<ExtraDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsContent {
    Text(MessageText),
    Binary(Payload),
}

#[derive(Debug, Clone)]
/// One validated mobile-terminated SMS request.
pub struct Sms {
    content: SmsContent,
    recipients: Vec<Recipient>,
    options: SmsOptions,
}

impl Sms {
    /// A text message sent to every recipient.
    pub fn text(
        message: MessageText,
        recipients: Vec<Recipient>,
        options: SmsOptions,
    ) -> Result<Self, ValidationError> {
        Self::from_parts(Some(message), None, recipients, options)
    }

    /// A binary message; tags and `max_parts` are unavailable.
    pub fn binary(
        payload: Payload,
        recipients: Vec<Recipient>,
        options: SmsOptions,
    ) -> Result<Self, ValidationError> {
        Self::from_parts(None, Some(payload), recipients, options)
    }

    /// Build from optional parts; exactly one of `message` and `payload` must be set.
    pub fn from_parts(
        message: Option<MessageText>,
        payload: Option<Payload>,
        recipients: Vec<Recipient>,
        options: SmsOptions,
    ) -> Result<Self, ValidationError> {
        let content = match (message, payload) {
            (Some(message), None) => SmsContent::Text(message),
            (None, Some(payload)) => SmsContent::Binary(payload),
            (Some(_), Some(_)) => return Err(ValidationError::MessageWithPayload),
            (None, None) => {
                return Err(ValidationError::Empty {
                    field: MessageText::FIELD,
                });
            }
        };

        validate_recipients(&recipients)?;
        validate_options(&content, &recipients, &options)?;

        Ok(Self {
            content,
            recipients,
            options,
        })
    }

    pub fn content(&self) -> &SmsContent {
        &self.content
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn options(&self) -> &SmsOptions {
        &self.options
    }
}

fn validate_recipients(recipients: &[Recipient]) -> Result<(), ValidationError> {
    if recipients.is_empty() {
        return Err(ValidationError::Empty {
            field: "recipients",
        });
    }
    if recipients.len() > SMS_MAX_RECIPIENTS {
        return Err(ValidationError::TooManyRecipients {
            max: SMS_MAX_RECIPIENTS,
            actual: recipients.len(),
        });
    }

    let mut seen = HashSet::with_capacity(recipients.len());
    for recipient in recipients {
        if !seen.insert(recipient.msisdn.as_str()) {
            return Err(ValidationError::DuplicateRecipient {
                msisdn: recipient.msisdn.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_options(
    content: &SmsContent,
    recipients: &[Recipient],
    options: &SmsOptions,
) -> Result<(), ValidationError> {
    let binary = matches!(content, SmsContent::Binary(_));

    if binary && options.tags.is_some() {
        return Err(ValidationError::TagsWithPayload);
    }
    if options.max_parts.is_some() {
        if binary {
            return Err(ValidationError::MaxPartsWithPayload);
        }
        if options.tags.is_some() {
            return Err(ValidationError::MaxPartsWithTags);
        }
    }

    match options.tags.as_deref() {
        Some(tags) => {
            for recipient in recipients {
                if recipient.tag_values.len() != tags.len() {
                    return Err(ValidationError::TagValueCountMismatch {
                        msisdn: recipient.msisdn.to_string(),
                        expected: tags.len(),
                        actual: recipient.tag_values.len(),
                    });
                }
            }
        }
        None => {
            if let Some(recipient) = recipients.iter().find(|r| !r.tag_values.is_empty()) {
                return Err(ValidationError::TagValuesWithoutTags {
                    msisdn: recipient.msisdn.to_string(),
                });
            }
        }
    }
    Ok(())
}
