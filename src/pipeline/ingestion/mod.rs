// Pipeline ingestion: turning a fetched payload into a raw table

pub mod csv_reader;

pub use csv_reader::{read_table, RawTable};
