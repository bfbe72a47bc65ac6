//! Transport layer: wire-format details (JSON encoding/decoding, request signing).

mod oauth;
mod send_sms;

pub use oauth::OAuthSigner;
pub use send_sms::{decode_error_json_response, decode_mt_sms_json_response, encode_mt_sms_json};
