//! RFC 5545 calendar export for routines.

pub mod ics;

pub use ics::{escape_text, to_ics, to_ics_at, ExportRoutine, IcsExport};
