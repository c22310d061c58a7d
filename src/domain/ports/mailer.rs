use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("mail server rejected credentials: {0}")]
    AuthFailure(String),
    #[error("mail transport failed: {0}")]
    TransportError(String),
    #[error("failed to read attachment {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeliveryError {
    /// Short stable label used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthFailure(_) => "auth",
            Self::TransportError(_) => "transport",
            Self::IoError { .. } => "io",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A fully assembled message; sender and recipient belong to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    pub attachment: Option<MailAttachment>,
}

pub trait MailTransport: Send + Sync {
    /// Open a session, authenticate, send `mail`, and close the session.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::AuthFailure` if the server rejects the
    /// credentials and `DeliveryError::TransportError` for any other
    /// connection, protocol or message-building failure.
    fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}
