use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::domain::types::CODE_TTL_SECS;
use crate::error::DeliveryError;

#[derive(Serialize)]
struct SmsRequest<'a> {
    to: &'a str,
    message: String,
}

/// Posts `{to, message}` as JSON to an HTTP SMS gateway.
#[derive(Clone)]
pub struct HttpSmsGateway {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpSmsGateway {
    pub fn new(url: String, token: Option<String>) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DeliveryError::Sms(e.to_string()))?;
        Ok(Self { client, url, token })
    }

    pub async fn send_code(&self, to: &str, code: &str) -> Result<(), DeliveryError> {
        let body = SmsRequest {
            to,
            message: sms_text(code),
        };
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DeliveryError::Sms(e.to_string()))?;
        info!(status = resp.status().as_u16(), "sms gateway accepted message");
        Ok(())
    }
}

pub fn sms_text(code: &str) -> String {
    format!(
        "Your verification code is {code}. It expires in {} minutes.",
        CODE_TTL_SECS / 60
    )
}
