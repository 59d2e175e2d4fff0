//! SMTP transport: lettre over implicit TLS, credentials checked up front.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::{CourierError, RenderedMessage};
use crate::ports::{Transport, TransportError};

/// Connection parameters for the submission server.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// Implicit-TLS submission port; 465 in production.
    pub port: u16,
    /// Sender address; also the authentication username.
    pub sender: String,
}

/// lettre-backed [`Transport`].
///
/// The handshake and authentication are verified in [`SmtpTransport::connect`]
/// so a bad password aborts the run before the first recipient, not in the
/// middle of a batch.
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpTransport {
    pub async fn connect(config: &SmtpConfig, password: &str) -> Result<Self, CourierError> {
        let sender: Mailbox = config
            .sender
            .parse()
            .map_err(|error| CourierError::Config(format!("sender address: {error}")))?;

        let credentials = Credentials::new(config.sender.clone(), password.to_string());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|error| CourierError::Config(format!("relay {}: {error}", config.host)))?
            .port(config.port)
            .credentials(credentials)
            .build();

        match transport.test_connection().await {
            Ok(true) => Ok(Self { transport, sender }),
            Ok(false) => Err(CourierError::Auth(format!(
                "{} did not accept the connection",
                config.host
            ))),
            Err(error) => Err(CourierError::Auth(error.to_string())),
        }
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn send(&self, message: &RenderedMessage) -> Result<(), TransportError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|error| TransportError::Delivery(format!("{}: {error}", message.to)))?;

        let email = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .map_err(|error| TransportError::Delivery(error.to_string()))?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|error| TransportError::Delivery(error.to_string()))
    }
}
