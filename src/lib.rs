//! Chart cells for CCG parsing.
//!
//! For every span of a sentence the parser keeps a [`ChartCell`] that decides
//! which candidate derivations survive. Cells group candidates by an
//! [`EquivalenceKey`] and apply one [`CellPolicy`]: first-arrival single best,
//! CKY best-by-score, bounded n-best with a relative cost beam (optionally
//! deduplicated by structural [`Fingerprint`]), or no pruning at all.
//!
//! ```
//! use ccgchart::{AgendaItem, Category, CellPolicy, Chart, ChartCellFactory, ChartOptions, Derivation, EquivalenceKey};
//! use std::sync::Arc;
//!
//! let categories = vec!["NP/N".parse::<Category>().unwrap(), "N".parse().unwrap()];
//! let options = ChartOptions { policy: CellPolicy::NBestHashed { nbest: 4, beam: 0.5 }, ..ChartOptions::default() };
//! let mut factory = ChartCellFactory::new(&options, &categories).unwrap();
//!
//! let mut chart = Chart::new(&mut factory, 2).unwrap();
//! let leaf = Arc::new(Derivation::leaf(categories[1].clone()));
//! let key = EquivalenceKey::of(&categories[1]);
//! assert!(chart.add(1, 2, AgendaItem::new(leaf, 1.0, -1.0, key)).unwrap());
//! assert_eq!(chart.cell(1, 2).unwrap().size(), 1);
//! ```

#[macro_use]
mod macros;
mod api;
mod category;
mod chart;
mod derivation;
mod error;
mod tagger;

pub use api::{ChartOptions, DEFAULT_MAX_SENTENCE_LENGTH, TaggerOptions};
pub use category::{Category, Slash, load_categories};
pub use chart::{
    AdmissionStats, CellPolicy, Chart, ChartCell, ChartCellFactory, ContributionTable, Fingerprint, PolicyTraits,
    Rejection, StructuralHasher,
};
pub use derivation::{AgendaItem, Derivation, DerivationId, EquivalenceKey, UnlabelledDependency};
pub use error::ChartError;
pub use tagger::{LexicalTagger, ScoredCategory, ScoredTagger, TagScorer, prune_tags};

use once_cell::sync::Lazy;

static DEBUG_ADMISSION: Lazy<bool> = Lazy::new(|| std::env::var_os("CCGCHART_DEBUG").is_some());

/// Whether per-admission debug events are enabled (`CCGCHART_DEBUG`).
pub(crate) fn debug_enabled() -> bool {
    *DEBUG_ADMISSION
}
