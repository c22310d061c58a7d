pub mod alert;
pub mod artifact;
pub mod sample;

pub use alert::CpuAlert;
pub use artifact::Artifact;
pub use sample::{Sample, TIMESTAMP_FORMAT};
