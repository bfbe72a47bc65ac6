use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    DestinationAddress, Encoding, ExtraDetails, MtSmsResponse, Priority, Recipient, ServiceError,
    Sms, SmsClass, SmsContent, Usage,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum TransportClass {
    Standard,
    Premium,
    Secret,
}

impl From<SmsClass> for TransportClass {
    fn from(value: SmsClass) -> Self {
        match value {
            SmsClass::Standard => Self::Standard,
            SmsClass::Premium => Self::Premium,
            SmsClass::Secret => Self::Secret,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TransportPriority {
    Bulk,
    Normal,
    Urgent,
    VeryUrgent,
}

impl From<Priority> for TransportPriority {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Bulk => Self::Bulk,
            Priority::Normal => Self::Normal,
            Priority::Urgent => Self::Urgent,
            Priority::VeryUrgent => Self::VeryUrgent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
enum TransportEncoding {
    Utf8,
    Ucs2,
}

impl From<Encoding> for TransportEncoding {
    fn from(value: Encoding) -> Self {
        match value {
            Encoding::Utf8 => Self::Utf8,
            Encoding::Ucs2 => Self::Ucs2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
enum TransportDestinationAddress {
    Display,
    Mobile,
    SimCard,
    ExtUnit,
}

impl From<DestinationAddress> for TransportDestinationAddress {
    fn from(value: DestinationAddress) -> Self {
        match value {
            DestinationAddress::Display => Self::Display,
            DestinationAddress::Mobile => Self::Mobile,
            DestinationAddress::SimCard => Self::SimCard,
            DestinationAddress::ExtUnit => Self::ExtUnit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum TransportExtraDetails {
    RecipientsUsage,
}

impl From<ExtraDetails> for TransportExtraDetails {
    fn from(value: ExtraDetails) -> Self {
        match value {
            ExtraDetails::RecipientsUsage => Self::RecipientsUsage,
        }
    }
}

/// JSON body of `POST /rest/mtsms`. Unset options are omitted, never sent as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct MtSmsJsonRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    recipients: Vec<RecipientJson<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<TransportClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sendtime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    userref: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<TransportPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validity_period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<TransportEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destaddr: Option<TransportDestinationAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    udh: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_parts: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra_details: Option<TransportExtraDetails>,
}

#[derive(Debug, Clone, Serialize)]
struct RecipientJson<'a> {
    msisdn: &'a str,
    #[serde(skip_serializing_if = "no_tag_values")]
    tagvalues: &'a [String],
}

fn no_tag_values(values: &&[String]) -> bool {
    values.is_empty()
}

impl<'a> From<&'a Recipient> for RecipientJson<'a> {
    fn from(value: &'a Recipient) -> Self {
        Self {
            msisdn: value.msisdn().as_str(),
            tagvalues: value.tag_values(),
        }
    }
}

pub fn encode_mt_sms_json(sms: &Sms) -> MtSmsJsonRequest<'_> {
    let (message, payload, udh) = match sms.content() {
        SmsContent::Text(message) => (Some(message.as_str()), None, None),
        SmsContent::Binary(payload) => (None, Some(payload.as_str()), payload.udh()),
    };
    let options = sms.options();

    MtSmsJsonRequest {
        message,
        recipients: sms.recipients().iter().map(RecipientJson::from).collect(),
        class: options.class.map(Into::into),
        sender: options.sender.as_ref().map(|sender| sender.as_str()),
        sendtime: options.sendtime.map(|time| time.value()),
        tags: options.tags.as_deref().filter(|tags| !tags.is_empty()),
        userref: non_empty(options.userref.as_deref()),
        priority: options.priority.map(Into::into),
        validity_period: options
            .validity_period
            .map(|period| period.as_secs())
            .filter(|secs| *secs != 0),
        encoding: options.encoding.map(Into::into),
        destaddr: options.destaddr.map(Into::into),
        payload,
        udh,
        callback_url: options.callback_url.as_ref().map(|url| url.as_str()),
        label: non_empty(options.label.as_deref()),
        max_parts: options.max_parts.map(|parts| parts.value()),
        extra_details: options.extra_details.map(Into::into),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|it| !it.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
struct MtSmsJsonResponse {
    ids: Vec<u64>,
    usage: UsageJson,
}

#[derive(Debug, Clone, Deserialize)]
struct UsageJson {
    #[serde(default)]
    countries: BTreeMap<String, u64>,
    currency: String,
    total_cost: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorJsonResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    incident_uuid: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    variables: Option<Vec<TransportVariable>>,
}

/// Template variable sent as a JSON string or any other scalar.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransportVariable {
    String(String),
    Other(serde_json::Value),
}

impl TransportVariable {
    fn into_string(self) -> String {
        match self {
            Self::String(value) => value,
            Self::Other(value) => value.to_string(),
        }
    }
}

pub fn decode_mt_sms_json_response(json: &[u8]) -> Result<MtSmsResponse, TransportError> {
    let parsed: MtSmsJsonResponse = serde_json::from_slice(json)?;
    Ok(MtSmsResponse {
        ids: parsed.ids,
        usage: Usage {
            countries: parsed.usage.countries,
            currency: parsed.usage.currency,
            total_cost: parsed.usage.total_cost,
        },
    })
}

/// Decode a structured error body. Only a JSON object is accepted; serde would
/// otherwise read an array positionally into [`ErrorJsonResponse`].
pub fn decode_error_json_response(json: &[u8]) -> Result<ServiceError, TransportError> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(json)?;
    let parsed: ErrorJsonResponse = serde_json::from_value(serde_json::Value::Object(object))?;
    Ok(ServiceError {
        code: parsed.code,
        incident_uuid: parsed.incident_uuid,
        message: parsed.message.unwrap_or_default(),
        variables: parsed
            .variables
            .unwrap_or_default()
            .into_iter()
            .map(TransportVariable::into_string)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use proptest::collection::{btree_set, vec};
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    use crate::domain::{
        CallbackUrl, MaxParts, MessageText, Msisdn, Payload, SenderId, SmsOptions,
        UnixTimestamp, ValidityPeriod,
    };

    use super::*;

    fn recipient(msisdn: &str) -> Recipient {
        Recipient::new(Msisdn::new(msisdn).unwrap())
    }

    fn to_json(sms: &Sms) -> serde_json::Value {
        serde_json::to_value(encode_mt_sms_json(sms)).unwrap()
    }

    #[test]
    fn encode_minimal_text_omits_unset_options() {
        let sms = Sms::text(
            MessageText::new("hello").unwrap(),
            vec![recipient("4512345678")],
            SmsOptions::default(),
        )
        .unwrap();

        assert_eq!(
            to_json(&sms),
            json!({
                "message": "hello",
                "recipients": [{ "msisdn": "4512345678" }]
            })
        );
    }

    #[test]
    fn encode_all_text_options() {
        let options = SmsOptions {
            class: Some(SmsClass::Premium),
            sender: Some(SenderId::new("ExampleCorp").unwrap()),
            sendtime: Some(UnixTimestamp::new(1_700_000_000)),
            tags: Some(vec!["%name%".to_owned()]),
            userref: Some("order-42".to_owned()),
            priority: Some(Priority::VeryUrgent),
            validity_period: Some(ValidityPeriod::from_secs(30)),
            encoding: Some(Encoding::Ucs2),
            destaddr: Some(DestinationAddress::SimCard),
            callback_url: Some(CallbackUrl::new("https://example.com/dlr").unwrap()),
            label: Some("customer-a".to_owned()),
            max_parts: None,
            extra_details: Some(ExtraDetails::RecipientsUsage),
        };
        let sms = Sms::text(
            MessageText::new("hi %name%").unwrap(),
            vec![recipient("4512345678").with_tag_values(["Ann"])],
            options,
        )
        .unwrap();

        assert_eq!(
            to_json(&sms),
            json!({
                "message": "hi %name%",
                "recipients": [{ "msisdn": "4512345678", "tagvalues": ["Ann"] }],
                "class": "premium",
                "sender": "ExampleCorp",
                "sendtime": 1_700_000_000u64,
                "tags": ["%name%"],
                "userref": "order-42",
                "priority": "VERY_URGENT",
                "validity_period": 30,
                "encoding": "UCS2",
                "destaddr": "SIMCARD",
                "callback_url": "https://example.com/dlr",
                "label": "customer-a",
                "extra_details": "recipients_usage"
            })
        );
    }

    #[test]
    fn encode_binary_sends_payload_and_udh_without_message() {
        let payload = Payload::new("aGVsbG8=").unwrap().with_udh("BQQLhAPs").unwrap();
        let sms = Sms::binary(
            payload,
            vec![recipient("4512345678")],
            SmsOptions {
                destaddr: Some(DestinationAddress::Display),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            to_json(&sms),
            json!({
                "recipients": [{ "msisdn": "4512345678" }],
                "destaddr": "DISPLAY",
                "payload": "aGVsbG8=",
                "udh": "BQQLhAPs"
            })
        );
    }

    #[test]
    fn encode_drops_zero_validity_and_empty_strings() {
        let sms = Sms::text(
            MessageText::new("hello").unwrap(),
            vec![recipient("4512345678")],
            SmsOptions {
                validity_period: Some(ValidityPeriod::from_secs(0)),
                userref: Some(String::new()),
                label: Some(String::new()),
                tags: Some(Vec::new()),
                max_parts: Some(MaxParts::new(3).unwrap()),
                ..Default::default()
            },
        );
        // Empty tags still count as "tags present" for the max_parts rule.
        assert!(sms.is_err());

        let sms = Sms::text(
            MessageText::new("hello").unwrap(),
            vec![recipient("4512345678")],
            SmsOptions {
                validity_period: Some(ValidityPeriod::from_secs(0)),
                userref: Some(String::new()),
                label: Some(String::new()),
                max_parts: Some(MaxParts::new(3).unwrap()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            to_json(&sms),
            json!({
                "message": "hello",
                "recipients": [{ "msisdn": "4512345678" }],
                "max_parts": 3
            })
        );
    }

    #[test]
    fn decode_success_response() {
        let json = br#"{"ids":[1,2],"usage":{"countries":{"DK":2},"currency":"EUR","total_cost":0.5}}"#;
        let resp = decode_mt_sms_json_response(json).unwrap();
        assert_eq!(resp.ids, vec![1, 2]);
        assert_eq!(resp.usage.currency, "EUR");
        assert_eq!(resp.usage.total_cost, 0.5);
        assert_eq!(resp.usage.countries.get("DK"), Some(&2));
    }

    #[test]
    fn decode_success_rejects_truncated_body() {
        let json = br#"{"ids":[1,2],"usage":{"countries":{"DK":2},"curr"#;
        assert!(matches!(
            decode_mt_sms_json_response(json),
            Err(TransportError::Json(_))
        ));
        assert!(decode_mt_sms_json_response(br#"{"ids":[1]}"#).is_err());
    }

    #[test]
    fn decode_error_response_stringifies_variables() {
        let json = br#"{
            "code": "0x0216",
            "incident_uuid": "d8127429-fcb4-4c07-a1d4-4f4c2b8e6b5c",
            "message": "bad %0 in %1",
            "variables": ["sender", 3]
        }"#;
        let err = decode_error_json_response(json).unwrap();
        assert_eq!(err.code.as_deref(), Some("0x0216"));
        assert_eq!(
            err.incident_uuid.as_deref(),
            Some("d8127429-fcb4-4c07-a1d4-4f4c2b8e6b5c")
        );
        assert_eq!(err.variables, vec!["sender".to_owned(), "3".to_owned()]);
        assert_eq!(err.render(), "code: 0x0216; bad sender in 3");
    }

    #[test]
    fn decode_error_response_tolerates_missing_fields() {
        let err = decode_error_json_response(b"{}").unwrap();
        assert_eq!(err, ServiceError::default());
        let err = decode_error_json_response(br#"{"message":"down","variables":null}"#).unwrap();
        assert_eq!(err.render(), "down");
        assert!(decode_error_json_response(b"<html>502</html>").is_err());
    }

    #[test]
    fn decode_error_response_requires_an_object() {
        let bodies: [&[u8]; 5] = [b"[]", br#"["0x01", null, "down"]"#, b"null", b"\"down\"", b"42"];
        for body in bodies {
            assert!(
                matches!(decode_error_json_response(body), Err(TransportError::Json(_))),
                "accepted {}",
                String::from_utf8_lossy(body)
            );
        }
    }

    const CLASSES: &[(SmsClass, &str)] = &[
        (SmsClass::Standard, "standard"),
        (SmsClass::Premium, "premium"),
        (SmsClass::Secret, "secret"),
    ];
    const PRIORITIES: &[(Priority, &str)] = &[
        (Priority::Bulk, "BULK"),
        (Priority::Normal, "NORMAL"),
        (Priority::Urgent, "URGENT"),
        (Priority::VeryUrgent, "VERY_URGENT"),
    ];
    const ENCODINGS: &[(Encoding, &str)] = &[(Encoding::Utf8, "UTF8"), (Encoding::Ucs2, "UCS2")];
    const DESTINATIONS: &[(DestinationAddress, &str)] = &[
        (DestinationAddress::Display, "DISPLAY"),
        (DestinationAddress::Mobile, "MOBILE"),
        (DestinationAddress::SimCard, "SIMCARD"),
        (DestinationAddress::ExtUnit, "EXTUNIT"),
    ];
    const EXTRA_DETAILS: &[(ExtraDetails, &str)] =
        &[(ExtraDetails::RecipientsUsage, "recipients_usage")];

    #[derive(Debug, Clone)]
    enum Body {
        Text(String),
        Binary(Vec<u8>, Option<Vec<u8>>),
    }

    fn sms_body() -> impl Strategy<Value = Body> {
        prop_oneof![
            "[A-Za-z0-9 %]{0,30}[a-z]".prop_map(Body::Text),
            (vec(any::<u8>(), 1..40), proptest::option::of(vec(any::<u8>(), 1..8)))
                .prop_map(|(data, udh)| Body::Binary(data, udh)),
        ]
    }

    /// An optional enum value paired with its expected wire spelling.
    fn wire<T>(
        choices: &'static [(T, &'static str)],
    ) -> impl Strategy<Value = Option<(T, &'static str)>>
    where
        T: Clone + std::fmt::Debug + 'static,
    {
        proptest::option::of(proptest::sample::select(choices))
    }

    fn encode_and_parse(sms: &Sms) -> Value {
        let bytes = serde_json::to_vec(&encode_mt_sms_json(sms)).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    proptest! {
        #[test]
        fn encode_round_trips_set_fields_and_omits_unset(
            msisdns in btree_set("[1-9][0-9]{6,14}", 1..6),
            body in sms_body(),
            class in wire(CLASSES),
            priority in wire(PRIORITIES),
            encoding in wire(ENCODINGS),
            destaddr in wire(DESTINATIONS),
            extra_details in wire(EXTRA_DETAILS),
            sender in proptest::option::of("[A-Za-z0-9]{1,11}"),
            sendtime in proptest::option::of(any::<u64>()),
            tags in proptest::option::of(vec("%[a-z]{1,8}%", 0..4)),
            userref in proptest::option::of("[a-z0-9-]{0,12}"),
            label in proptest::option::of("[a-z0-9-]{0,12}"),
            validity in proptest::option::of(any::<u32>()),
            callback_url in proptest::option::of("https://example\\.com/[a-z]{0,10}"),
            max_parts in proptest::option::of(1u8..=255)
        ) {
            let is_text = matches!(body, Body::Text(_));
            // Tags are text-only, and max_parts excludes both tags and payloads.
            let tags = tags.filter(|_| is_text);
            let max_parts = max_parts.filter(|_| is_text && tags.is_none());

            let mut expected = Map::new();

            let mut recipients = Vec::new();
            let mut wire_recipients = Vec::new();
            for msisdn in &msisdns {
                let values: Vec<String> = tags
                    .iter()
                    .flatten()
                    .map(|tag| format!("{tag}:{msisdn}"))
                    .collect();
                let mut wire_recipient = json!({ "msisdn": msisdn });
                if !values.is_empty() {
                    wire_recipient["tagvalues"] = json!(values);
                }
                wire_recipients.push(wire_recipient);
                recipients.push(recipient(msisdn).with_tag_values(values));
            }
            expected.insert("recipients".to_owned(), Value::Array(wire_recipients));

            let (message, payload) = match &body {
                Body::Text(text) => {
                    expected.insert("message".to_owned(), json!(text));
                    (Some(MessageText::new(text.clone()).unwrap()), None)
                }
                Body::Binary(data, udh) => {
                    expected.insert("payload".to_owned(), json!(BASE64.encode(data)));
                    let mut payload = Payload::from_bytes(data).unwrap();
                    if let Some(udh) = udh {
                        let udh = BASE64.encode(udh);
                        expected.insert("udh".to_owned(), json!(udh));
                        payload = payload.with_udh(udh).unwrap();
                    }
                    (None, Some(payload))
                }
            };

            let mut options = SmsOptions::default();
            if let Some((value, spelling)) = class {
                options.class = Some(value);
                expected.insert("class".to_owned(), json!(spelling));
            }
            if let Some((value, spelling)) = priority {
                options.priority = Some(value);
                expected.insert("priority".to_owned(), json!(spelling));
            }
            if let Some((value, spelling)) = encoding {
                options.encoding = Some(value);
                expected.insert("encoding".to_owned(), json!(spelling));
            }
            if let Some((value, spelling)) = destaddr {
                options.destaddr = Some(value);
                expected.insert("destaddr".to_owned(), json!(spelling));
            }
            if let Some((value, spelling)) = extra_details {
                options.extra_details = Some(value);
                expected.insert("extra_details".to_owned(), json!(spelling));
            }
            if let Some(sender) = sender {
                expected.insert("sender".to_owned(), json!(sender));
                options.sender = Some(SenderId::new(sender).unwrap());
            }
            if let Some(sendtime) = sendtime {
                expected.insert("sendtime".to_owned(), json!(sendtime));
                options.sendtime = Some(UnixTimestamp::new(sendtime));
            }
            if let Some(tags) = tags {
                if !tags.is_empty() {
                    expected.insert("tags".to_owned(), json!(tags));
                }
                options.tags = Some(tags);
            }
            if let Some(userref) = userref {
                if !userref.is_empty() {
                    expected.insert("userref".to_owned(), json!(userref));
                }
                options.userref = Some(userref);
            }
            if let Some(label) = label {
                if !label.is_empty() {
                    expected.insert("label".to_owned(), json!(label));
                }
                options.label = Some(label);
            }
            if let Some(secs) = validity {
                if secs != 0 {
                    expected.insert("validity_period".to_owned(), json!(secs));
                }
                options.validity_period = Some(ValidityPeriod::from_secs(secs));
            }
            if let Some(url) = callback_url {
                expected.insert("callback_url".to_owned(), json!(url));
                options.callback_url = Some(CallbackUrl::new(url).unwrap());
            }
            if let Some(parts) = max_parts {
                expected.insert("max_parts".to_owned(), json!(parts));
                options.max_parts = Some(MaxParts::new(parts).unwrap());
            }

            let sms = Sms::from_parts(message, payload, recipients, options).unwrap();
            let actual = encode_and_parse(&sms);
            let actual = actual.as_object().unwrap();

            for (key, value) in &expected {
                prop_assert_eq!(actual.get(key), Some(value), "field {}", key);
            }
            for key in actual.keys() {
                prop_assert!(expected.contains_key(key), "unset field {} was sent", key);
            }
        }
    }
}
