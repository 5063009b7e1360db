//! Output seam: where candidate and match rows are handed to persistence.

use crate::types::{CompositeCandidate, MatchResult};
use serde::{Deserialize, Serialize};

/// Receiver of the three output tables.
///
/// # Implementations
///
/// - **In memory**: [`TableSink`] - plain vectors, used by tests and the simulator
/// - **Framework**: a table writer owned by the batch driver
///
/// Rows arrive in input iteration order and must be stored in that order.
pub trait RecordSink {
    /// Appends one composite-candidate row.
    fn write_candidate(&mut self, candidate: &CompositeCandidate);

    /// Appends one reconstruction-level match row.
    fn write_rec_match(&mut self, result: MatchResult);

    /// Appends one generation-level match row.
    fn write_gen_match(&mut self, result: MatchResult);
}

/// In-memory tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSink {
    pub candidates: Vec<CompositeCandidate>,
    pub rec_matches: Vec<MatchResult>,
    pub gen_matches: Vec<MatchResult>,
}

impl TableSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across the three tables.
    pub fn row_count(&self) -> usize {
        self.candidates.len() + self.rec_matches.len() + self.gen_matches.len()
    }
}

impl RecordSink for TableSink {
    fn write_candidate(&mut self, candidate: &CompositeCandidate) {
        self.candidates.push(candidate.clone());
    }

    fn write_rec_match(&mut self, result: MatchResult) {
        self.rec_matches.push(result);
    }

    fn write_gen_match(&mut self, result: MatchResult) {
        self.gen_matches.push(result);
    }
}
