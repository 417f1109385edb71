use tracing::{info, warn};

use crate::domain::repository::CodeDelivery;
use crate::domain::types::{DeliveryReport, Identifier};
use crate::error::DeliveryError;
use crate::infra::mail::SmtpMailer;
use crate::infra::sms::HttpSmsGateway;

/// Routes a code to the transport for its identifier's channel. A channel
/// without a configured transport logs the code instead of sending it.
#[derive(Clone, Default)]
pub struct ChannelDelivery {
    pub mailer: Option<SmtpMailer>,
    pub sms: Option<HttpSmsGateway>,
}

impl CodeDelivery for ChannelDelivery {
    async fn send(
        &self,
        identifier: &Identifier,
        code: &str,
    ) -> Result<DeliveryReport, DeliveryError> {
        let sent = match identifier {
            Identifier::Email(to) => match &self.mailer {
                Some(mailer) => Some(mailer.send_code(to, code).await),
                None => None,
            },
            Identifier::Sms(to) => match &self.sms {
                Some(gateway) => Some(gateway.send_code(to, code).await),
                None => None,
            },
        };

        match sent {
            Some(Ok(())) => Ok(DeliveryReport::delivered()),
            Some(Err(e)) => Err(e),
            None => {
                warn!(
                    channel = identifier.channel().as_str(),
                    "delivery channel not configured; logging code instead"
                );
                info!(
                    channel = identifier.channel().as_str(),
                    to = %identifier.masked(),
                    code,
                    "simulated verification code delivery"
                );
                Ok(DeliveryReport::simulated())
            }
        }
    }
}
