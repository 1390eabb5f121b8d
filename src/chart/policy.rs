//! Admission policies.
//!
//! A policy decides, per equivalence key, which offered items a cell keeps.
//! The set is closed: a factory is bound to one [`CellPolicy`] at construction
//! and every cell it makes follows it.
//!
//! | policy           | per key      | decision                                  |
//! |------------------|--------------|-------------------------------------------|
//! | `OneBest`        | 1            | first offer wins (hashed storage)         |
//! | `OneBestOrdered` | 1            | first offer wins (key-ordered storage)    |
//! | `OneBestCky`     | 1            | strictly higher inside score replaces     |
//! | `NBest`          | `nbest + 1`  | count limit + relative cost beam          |
//! | `NBestHashed`    | `nbest + 1`  | as `NBest`, minus structural duplicates   |
//! | `Unbounded`      | all          | keep everything                           |
//!
//! ## Best-first precondition
//!
//! `OneBest*`, `NBest` and `NBestHashed` treat the *first* item offered for a
//! key as the best one. They are only correct when the agenda offers items of
//! one key in non-increasing order of quality. Check
//! [`PolicyTraits::REQUIRES_BEST_FIRST`] before wiring a policy to an agenda
//! that does not guarantee this; `OneBestCky` is the policy for such agendas.

use crate::ChartError;

bitflags::bitflags! {
    /// Coarse properties of a policy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PolicyTraits: u8 {
        /// Groups items by equivalence key.
        const KEYED               = 1 << 0;
        /// Caps the number of items per key.
        const BOUNDED             = 1 << 1;
        /// A later item can evict an earlier one.
        const REPLACES            = 1 << 2;
        /// Rejects structural duplicates (needs the contribution table).
        const STRUCTURAL_DEDUP    = 1 << 3;
        /// Assumes the first item offered per key is the best one.
        const REQUIRES_BEST_FIRST = 1 << 4;
        /// `entries()` iterates in key order.
        const ORDERED_KEYS        = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CellPolicy {
    /// One item per key, first arrival wins.
    #[default]
    OneBest,
    /// [`CellPolicy::OneBest`] over key-ordered storage.
    OneBestOrdered,
    /// One item per key, higher inside score wins, ties keep the incumbent.
    OneBestCky,
    /// Up to `nbest + 1` items per key within a relative cost beam.
    NBest { nbest: usize, beam: f64 },
    /// [`CellPolicy::NBest`] that also drops structurally equivalent items.
    NBestHashed { nbest: usize, beam: f64 },
    /// Keep every item in arrival order.
    Unbounded,
}

impl CellPolicy {
    pub fn traits(&self) -> PolicyTraits {
        match self {
            CellPolicy::OneBest => PolicyTraits::KEYED | PolicyTraits::BOUNDED | PolicyTraits::REQUIRES_BEST_FIRST,
            CellPolicy::OneBestOrdered => {
                PolicyTraits::KEYED
                    | PolicyTraits::BOUNDED
                    | PolicyTraits::REQUIRES_BEST_FIRST
                    | PolicyTraits::ORDERED_KEYS
            }
            CellPolicy::OneBestCky => PolicyTraits::KEYED | PolicyTraits::BOUNDED | PolicyTraits::REPLACES,
            CellPolicy::NBest { .. } => {
                PolicyTraits::KEYED | PolicyTraits::BOUNDED | PolicyTraits::REQUIRES_BEST_FIRST
            }
            CellPolicy::NBestHashed { .. } => {
                PolicyTraits::KEYED
                    | PolicyTraits::BOUNDED
                    | PolicyTraits::REQUIRES_BEST_FIRST
                    | PolicyTraits::STRUCTURAL_DEDUP
            }
            CellPolicy::Unbounded => PolicyTraits::empty(),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            CellPolicy::OneBest => "one-best",
            CellPolicy::OneBestOrdered => "one-best-ordered",
            CellPolicy::OneBestCky => "one-best-cky",
            CellPolicy::NBest { .. } => "nbest",
            CellPolicy::NBestHashed { .. } => "nbest-hashed",
            CellPolicy::Unbounded => "unbounded",
        }
    }

    /// Check the n-best parameters. The beam is a fraction in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ChartError> {
        match *self {
            CellPolicy::NBest { beam, .. } | CellPolicy::NBestHashed { beam, .. } => {
                if beam > 0.0 && beam <= 1.0 {
                    Ok(())
                } else {
                    Err(ChartError::InvalidOption { name: "nbest_beam", reason: format!("{beam} is not in (0, 1]") })
                }
            }
            _ => Ok(()),
        }
    }
}
