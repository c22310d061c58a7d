use crate::domain::entities::alert::CpuAlert;
use crate::domain::entities::artifact::Artifact;
use crate::domain::ports::mailer::{DeliveryError, MailAttachment, MailTransport, OutgoingMail};

/// What happened to a delivery request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// The artifact file was absent; nothing was sent.
    SkippedMissingArtifact,
}

/// Delivers alerts and artifacts through a [`MailTransport`].
///
/// An artifact is deleted only after a successful send. On failure it stays
/// on disk for inspection or a manual retry; nothing is retried here.
pub struct Notifier<'a> {
    transport: &'a dyn MailTransport,
}

impl<'a> Notifier<'a> {
    #[must_use]
    pub fn new(transport: &'a dyn MailTransport) -> Self {
        Self { transport }
    }

    /// Send `artifact` as an attachment, then delete it.
    ///
    /// A missing artifact is a no-op returning
    /// [`DeliveryOutcome::SkippedMissingArtifact`].
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::IoError` if the artifact cannot be read, or the
    /// transport's `AuthFailure`/`TransportError`. The artifact is left in
    /// place in every error case.
    pub fn deliver(
        &self,
        artifact: Artifact,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        if !artifact.exists() {
            tracing::warn!(
                path = %artifact.path().display(),
                "artifact missing, delivery skipped"
            );
            return Ok(DeliveryOutcome::SkippedMissingArtifact);
        }

        let bytes = std::fs::read(artifact.path()).map_err(|source| DeliveryError::IoError {
            path: artifact.path().to_path_buf(),
            source,
        });
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => return Err(log_failure(e)),
        };

        let mail = OutgoingMail {
            subject: subject.to_string(),
            body: body.to_string(),
            attachment: Some(MailAttachment {
                filename: artifact.file_name(),
                content_type: artifact.content_type().to_string(),
                bytes,
            }),
        };
        self.transport.send(&mail).map_err(log_failure)?;

        if let Err(e) = std::fs::remove_file(artifact.path()) {
            tracing::warn!(
                path = %artifact.path().display(),
                "delivered artifact could not be deleted: {e}"
            );
        }
        tracing::info!(path = %artifact.path().display(), "artifact delivered");
        Ok(DeliveryOutcome::Sent)
    }

    /// Send the lightweight alert message. No attachment, nothing to clean up.
    ///
    /// # Errors
    ///
    /// Returns the transport's `AuthFailure`/`TransportError`.
    pub fn send_alert(&self, alert: &CpuAlert) -> Result<DeliveryOutcome, DeliveryError> {
        let mail = OutgoingMail {
            subject: alert.subject(),
            body: alert.body(),
            attachment: None,
        };
        self.transport.send(&mail).map_err(log_failure)?;
        tracing::info!(cpu = alert.cpu_pct, threshold = alert.threshold, "alert delivered");
        Ok(DeliveryOutcome::Sent)
    }
}

fn log_failure(err: DeliveryError) -> DeliveryError {
    tracing::error!(kind = err.kind(), "delivery failed: {err}");
    err
}
