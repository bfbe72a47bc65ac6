use std::io;

use gatewayapi::{
    Credentials, DestinationAddress, GatewayApiClient, GatewayApiError, Msisdn, Payload,
    Recipient, Sms, SmsOptions,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let key = std::env::var("GATEWAYAPI_KEY").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "GATEWAYAPI_KEY environment variable is required",
        )
    })?;
    let secret = std::env::var("GATEWAYAPI_SECRET").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "GATEWAYAPI_SECRET environment variable is required",
        )
    })?;
    let msisdn = std::env::var("GATEWAYAPI_MSISDN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "GATEWAYAPI_MSISDN environment variable is required",
        )
    })?;

    let client = GatewayApiClient::new(Credentials::new(key, secret)?)?;
    let sms = Sms::binary(
        Payload::from_bytes(b"\x01\x02\x03")?,
        vec![Recipient::new(Msisdn::new(msisdn)?)],
        SmsOptions {
            destaddr: Some(DestinationAddress::Mobile),
            ..Default::default()
        },
    )?;

    match client.send_sms(&sms).await {
        Ok(response) => println!("ids: {:?}", response.ids),
        Err(GatewayApiError::Api { status, error }) => {
            eprintln!(
                "rejected with HTTP {status}: {error} (incident {})",
                error.incident_uuid.as_deref().unwrap_or("-")
            );
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
