// src/services/mod.rs

pub mod catalogue; // the ONLY SQLite writer
pub mod query;
pub mod scanner;
pub mod validate;

// Public API
pub use catalogue::{Catalogue, MediaRecord, TagUpdate};
pub use query::{parse_size, run_query, MediaKind, MediaQuery, Range};
pub use scanner::{ScanReport, Scanner};
pub use validate::UpdateError;
