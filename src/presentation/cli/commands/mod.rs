pub mod history;
pub mod run;
pub mod status;

use std::process::ExitCode;

use crate::application::services::probe::RunSummary;

/// Exit status for a run-fatal error.
pub const FATAL_EXIT_STATUS: u8 = 1;

/// How a command that did not error finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The pipeline ran to the end but an alert or report was not delivered.
    DeliveryFailed,
}

impl Outcome {
    #[must_use]
    pub const fn from_summary(summary: &RunSummary) -> Self {
        if summary.delivery_failed() {
            Self::DeliveryFailed
        } else {
            Self::Completed
        }
    }

    #[must_use]
    pub const fn exit_status(self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::DeliveryFailed => 1,
        }
    }

    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}
