//! Mail delivery via an SMTP relay.
//!
//! [`SmtpMailTransport`] wraps the blocking `lettre` SMTP transport. The
//! connection pool is compiled out, so every [`MailTransport::send`] call
//! opens its own session (connect, STARTTLS, AUTH, MAIL, QUIT). Each session
//! is bounded by the configured timeout.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::application::config::{MailCredentials, SmtpConfig};
use crate::domain::ports::mailer::{DeliveryError, MailTransport, OutgoingMail};

/// SMTP reply codes that mean the server refused our credentials.
const AUTH_REPLY_CODES: &[&str] = &["530", "534", "535"];

/// Enhanced status class for security and policy failures (RFC 3463).
const AUTH_ENHANCED_CLASS: &str = "5.7.";

pub struct SmtpMailTransport {
    from: Mailbox,
    to: Mailbox,
    transport: SmtpTransport,
}

impl SmtpMailTransport {
    /// Build a transport for `settings` authenticating as `credentials.sender`.
    ///
    /// No connection is made here.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::TransportError` if an address does not parse or
    /// the relay's TLS parameters cannot be built.
    pub fn new(settings: &SmtpConfig, credentials: &MailCredentials) -> Result<Self, DeliveryError> {
        let from: Mailbox = credentials.sender.parse().map_err(|e| {
            DeliveryError::TransportError(format!("invalid sender address: {e}"))
        })?;
        let to: Mailbox = credentials.recipient.parse().map_err(|e| {
            DeliveryError::TransportError(format!("invalid recipient address: {e}"))
        })?;

        let transport = SmtpTransport::starttls_relay(&settings.host)
            .map_err(|e| classify(&e))?
            .port(settings.port)
            .credentials(Credentials::new(
                credentials.sender.clone(),
                credentials.password.clone(),
            ))
            .timeout(Some(settings.timeout()))
            .build();

        Ok(Self { from, to, transport })
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, DeliveryError> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(mail.subject.clone());
        let text = SinglePart::plain(mail.body.clone());

        let message = match &mail.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                    DeliveryError::TransportError(format!(
                        "invalid attachment content type {}: {e}",
                        attachment.content_type
                    ))
                })?;
                let part = Attachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type);
                builder.multipart(MultiPart::mixed().singlepart(text).singlepart(part))
            }
            None => builder.singlepart(text),
        };

        message.map_err(|e| DeliveryError::TransportError(format!("cannot build message: {e}")))
    }
}

impl MailTransport for SmtpMailTransport {
    fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = self.build_message(mail)?;
        self.transport.send(&message).map_err(|e| classify(&e))?;
        tracing::info!(to = %self.to, subject = %mail.subject, "mail sent");
        Ok(())
    }
}

fn classify(err: &lettre::transport::smtp::Error) -> DeliveryError {
    let code = err.status().map(|c| c.to_string());
    if is_auth_failure(code.as_deref(), &err.to_string()) {
        DeliveryError::AuthFailure(err.to_string())
    } else {
        DeliveryError::TransportError(err.to_string())
    }
}

/// Decides from the SMTP reply, or failing that the error text, whether the
/// server rejected authentication.
///
/// Auth failures are the 530/534/535 replies and any other permanent (5xx)
/// reply carrying a `5.7.x` enhanced status. Errors raised before the server
/// replied are matched on their text.
fn is_auth_failure(code: Option<&str>, message: &str) -> bool {
    match code {
        Some(code) if AUTH_REPLY_CODES.contains(&code) => true,
        Some(code) => code.starts_with('5') && has_enhanced_auth_status(message),
        None => {
            let lower = message.to_lowercase();
            lower.contains("authentication") || lower.contains("credentials")
        }
    }
}

/// True if `message` contains an enhanced status code of the form `5.7.N`.
fn has_enhanced_auth_status(message: &str) -> bool {
    message
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter_map(|token| token.strip_prefix(AUTH_ENHANCED_CLASS))
        .any(|detail| !detail.is_empty() && detail.chars().all(|c| c.is_ascii_digit()))
}
