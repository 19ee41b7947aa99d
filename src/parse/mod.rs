// src/parse/mod.rs
//! Source-format parsing: the layout document and the transport records.

pub mod layout;
pub mod records;

pub use records::{ParsedRecords, RecordParser, TransportRecord};
