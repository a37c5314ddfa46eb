// SPDX-License-Identifier: PMPL-1.0-or-later

//! Result aggregator: deduplicates and sorts Race Records for stable output.

use crate::types::RaceRecord;

/// Deduplicate identical records and sort the rest into the canonical order.
pub fn finalize(mut records: Vec<RaceRecord>) -> Vec<RaceRecord> {
    records.sort();
    records.dedup();
    records
}
