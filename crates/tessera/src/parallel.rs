//! Parallel extraction over many compilation units.
//!
//! Units share nothing mutable: each worker builds its own position index
//! and records, and the only shared state is the extractor's configuration
//! and its `Sync` build log.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       extract_units                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Parallel:    rayon::par_iter() one unit per task           │
//! │  Sequential:  caller writes results in input order          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use rayon::prelude::*;

use crate::Extractor;
use crate::error::Result;
use crate::types::UnitExtraction;
use crate::unit::CompilationUnit;

/// Extract all units on the rayon pool, keeping input order.
pub(crate) fn extract_units(
    extractor: &Extractor,
    units: &[CompilationUnit],
) -> Result<Vec<UnitExtraction>> {
    tracing::debug!(units = units.len(), "Extracting units in parallel");
    units
        .par_iter()
        .map(|unit| extractor.extract(Some(unit)))
        .collect()
}
