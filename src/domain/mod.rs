//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{
    DestinationAddress, Encoding, ExtraDetails, Priority, Recipient, SMS_MAX_RECIPIENTS, Sms,
    SmsClass, SmsContent, SmsOptions,
};
pub use response::{MtSmsResponse, ServiceError, Usage};
pub use validation::ValidationError;
pub use value::{
    ApiKey, ApiSecret, CallbackUrl, MaxParts, MessageText, Msisdn, Payload, PhoneNumber,
    SenderId, UnixTimestamp, ValidityPeriod,
};
