use std::io;

use gatewayapi::{
    Credentials, GatewayApiClient, MessageText, PhoneNumber, Recipient, Sms, SmsOptions,
};
use tracing_subscriber::EnvFilter;

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let key = required_env("GATEWAYAPI_KEY")?;
    let secret = required_env("GATEWAYAPI_SECRET")?;
    let phone_raw = required_env("GATEWAYAPI_MSISDN")?;
    let message = std::env::var("GATEWAYAPI_MESSAGE")
        .unwrap_or_else(|_| "Hello from the gatewayapi demo.".to_owned());
    let debug = std::env::var("GATEWAYAPI_DEBUG").is_ok_and(|value| value == "1");

    let client = GatewayApiClient::builder(Credentials::new(key, secret)?)
        .debug(debug)
        .build()?;
    let phone = PhoneNumber::parse(None, phone_raw)?;
    let sms = Sms::text(
        MessageText::new(message)?,
        vec![Recipient::new(phone.into())],
        SmsOptions::default(),
    )?;

    let response = client.send_sms(&sms).await?;
    println!(
        "ids: {:?}, cost: {} {}",
        response.ids, response.usage.total_cost, response.usage.currency
    );

    Ok(())
}
