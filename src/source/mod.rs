mod client;
mod csv_file;
mod memory;

pub use client::LogSource;
pub use csv_file::{CsvLogSource, load_logs};
pub use memory::MemoryLogSource;
