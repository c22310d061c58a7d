pub mod csv_log;
pub mod in_memory_log;
