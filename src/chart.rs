//! Per-span dynamic programming.
//!
//! This module holds everything between the agenda and the rest of the
//! parser: cells that decide which derivations survive for a span, the
//! factory that makes them, and the structural hasher some policies use to
//! spot duplicate analyses.
//!
//! ## How the parts work together
//!
//! ```text
//! categories + ChartOptions
//!        │  ChartCellFactory::new            (factory.rs)
//!        │    └─ ContributionTable::build     (hasher.rs)
//!        v
//!   per sentence: Chart::new(&mut factory, n) (spans.rs)
//!        │    └─ start_sentence: clear fingerprint cache, check n
//!        │    └─ make() per span
//!        v
//!   agenda ──add(item)──▶ ChartCell            (cell.rs)
//!                           └─ CellPolicy      (policy.rs)
//!                           └─ StructuralHasher::fingerprint (NBestHashed)
//!                           └─ AdmissionStats  (metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `policy.rs`: the closed set of admission policies and their traits.
//! - `cell.rs`: storage and admission for each policy.
//! - `hasher.rs`: contribution table and memoized fingerprints.
//! - `factory.rs`: binds a policy, owns table and cache, sentence lifecycle.
//! - `spans.rs`: a sentence's cells indexed by span, lexical seeding.
//! - `metrics.rs`: admission counters.
//!
//! ## Debugging
//!
//! Set `CCGCHART_DEBUG=1` to emit a `tracing` debug event for every admission
//! decision.

#[path = "chart/cell.rs"]
mod cell;
#[path = "chart/factory.rs"]
mod factory;
#[path = "chart/hasher.rs"]
mod hasher;
#[path = "chart/metrics.rs"]
mod metrics;
#[path = "chart/policy.rs"]
mod policy;
#[path = "chart/spans.rs"]
mod spans;

#[cfg(test)]
#[path = "chart/tests.rs"]
mod tests;

pub use cell::ChartCell;
pub use factory::ChartCellFactory;
pub use hasher::{ContributionTable, Fingerprint, StructuralHasher};
pub use metrics::{AdmissionStats, Rejection};
pub use policy::{CellPolicy, PolicyTraits};
pub use spans::Chart;
