//! slotplan-ingest: boundary parsers turning collaborator payloads into engine inputs.

pub mod error;
pub mod parsers;
pub mod types;

pub use error::IngestError;
pub use parsers::extraction::{advice_prompt, extraction_prompt, parse_extraction};
pub use parsers::google_events::{parse_events, parse_events_json};
pub use parsers::slot_csv::{parse_slot_csv, parse_slot_csv_reader};
pub use types::{ExtractedTask, Extraction, RawEvent, RawEventTime};
