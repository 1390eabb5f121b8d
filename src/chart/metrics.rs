//! Admission counters.
//!
//! Each cell counts what happened to the items offered to it. The counters
//! cost a few increments per offer and are meant for tuning beams and
//! comparing policies on the same agenda (e.g. against the unbounded
//! baseline).
//!
//! Invariant: `offered == admitted + rejected()`. `replaced` is a subset of
//! `admitted` (CKY replacements).

use std::ops::AddAssign;

/// Why a cell declined an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Single-best cell already holds an item for the key.
    Occupied,
    /// CKY cell holds an item with an equal or better inside score.
    NotBetter,
    /// N-best list for the key is already over its limit.
    Count,
    /// Cost falls outside the relative beam of the key's first item.
    Beam,
    /// An item with the same structural fingerprint is already held.
    Duplicate,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionStats {
    pub offered: usize,
    pub admitted: usize,
    /// Admissions that evicted a previously held item.
    pub replaced: usize,
    pub rejected_occupied: usize,
    pub rejected_not_better: usize,
    pub rejected_count: usize,
    pub rejected_beam: usize,
    pub rejected_duplicate: usize,
}

impl AdmissionStats {
    pub(crate) fn record_admitted(&mut self, replaced: bool) {
        self.offered += 1;
        self.admitted += 1;
        if replaced {
            self.replaced += 1;
        }
    }

    pub(crate) fn record_rejected(&mut self, why: Rejection) {
        self.offered += 1;
        match why {
            Rejection::Occupied => self.rejected_occupied += 1,
            Rejection::NotBetter => self.rejected_not_better += 1,
            Rejection::Count => self.rejected_count += 1,
            Rejection::Beam => self.rejected_beam += 1,
            Rejection::Duplicate => self.rejected_duplicate += 1,
        }
    }

    /// Total rejections, any cause.
    pub fn rejected(&self) -> usize {
        self.rejected_occupied
            + self.rejected_not_better
            + self.rejected_count
            + self.rejected_beam
            + self.rejected_duplicate
    }
}

impl AddAssign for AdmissionStats {
    fn add_assign(&mut self, other: AdmissionStats) {
        self.offered += other.offered;
        self.admitted += other.admitted;
        self.replaced += other.replaced;
        self.rejected_occupied += other.rejected_occupied;
        self.rejected_not_better += other.rejected_not_better;
        self.rejected_count += other.rejected_count;
        self.rejected_beam += other.rejected_beam;
        self.rejected_duplicate += other.rejected_duplicate;
    }
}
