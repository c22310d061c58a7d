pub mod mailer;
pub mod renderer;
pub mod sampler;
pub mod store;

pub use mailer::{DeliveryError, MailAttachment, MailTransport, OutgoingMail};
pub use renderer::{ChartRenderer, DocumentComposer, RenderError, ReportDocument};
pub use sampler::{MetricSampler, SamplingError};
pub use store::{HealthLog, StoreError};
