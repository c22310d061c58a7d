pub mod cpu;

pub use cpu::{should_alert, CpuThresholdRule};
