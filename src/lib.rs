//! Typed Rust client for the GatewayAPI SMS REST API.
//!
//! The crate has three layers: a domain layer of validated types, a transport layer
//! for wire-format and OAuth 1.0a signing details, and a small client layer that
//! sends one signed request and classifies the response.
//!
//! ```rust,no_run
//! use gatewayapi::{Credentials, GatewayApiClient, MessageText, Msisdn, Recipient, Sms, SmsOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gatewayapi::GatewayApiError> {
//!     let client = GatewayApiClient::new(Credentials::new("key", "secret")?)?;
//!     let recipient = Recipient::new(Msisdn::new("4512345678")?);
//!     let sms = Sms::text(MessageText::new("hello")?, vec![recipient], SmsOptions::default())?;
//!     let response = client.send_sms(&sms).await?;
//!     println!("ids: {:?}", response.ids);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    Credentials, GatewayApiClient, GatewayApiClientBuilder, GatewayApiError, HttpResponse,
    REQUEST_TIMEOUT,
};
pub use domain::{
    ApiKey, ApiSecret, CallbackUrl, DestinationAddress, Encoding, ExtraDetails, MaxParts,
    MessageText, MtSmsResponse, Msisdn, Payload, PhoneNumber, Priority, Recipient,
    SMS_MAX_RECIPIENTS, SenderId, ServiceError, Sms, SmsClass, SmsContent, SmsOptions,
    UnixTimestamp, Usage, ValidationError, ValidityPeriod,
};
pub use reqwest::Method;
