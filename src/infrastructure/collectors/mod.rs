pub mod disk_collector;
pub mod sysinfo_sampler;
