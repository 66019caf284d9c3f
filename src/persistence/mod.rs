//! Result persistence
//!
//! Features:
//! - One semicolon-delimited record file per player (`<player>.csv`)
//! - Append-only, header written when the file is created
//! - Missing files read as "no history"; malformed rows are skipped

pub mod records;

pub use records::{RECORD_HEADER, RecordRow, RecordStore, parse_records};

use crate::error::Result;
use crate::settings::Mode;

/// Where finished sessions are written
pub trait ScorePersistence {
    /// Append one finished (cleared or lost) session; `score` is whole seconds
    fn record_result(
        &mut self,
        player: &str,
        level: &str,
        mode: Mode,
        score: u64,
        cleared: bool,
    ) -> Result<()>;
}
