//! Chart cell factories.
//!
//! A factory is bound to one [`CellPolicy`] and hands out empty cells, one per
//! span. It also owns the state that outlives a single cell:
//!
//! - the dependency contribution table (built once, immutable, `Arc`-shared);
//! - the derivation → fingerprint cache (valid for the sentence in flight).
//!
//! ```text
//! ChartCellFactory::new(options, categories)   once per grammar
//!   └─ for each sentence:
//!        start_sentence(len)                   clear cache, check len
//!        make() × spans                        one cell per span
//! ```
//!
//! The cache is shared with the cells through `Rc<RefCell<_>>`, so a factory
//! and its cells stay on one thread. To parse sentences in parallel, [`fork`]
//! a factory per worker: forks share the table and get their own cache.
//!
//! [`fork`]: ChartCellFactory::fork

use super::cell::{ChartCell, SharedHasher};
use super::hasher::{ContributionTable, Fingerprint, StructuralHasher};
use super::policy::{CellPolicy, PolicyTraits};
use crate::{Category, ChartError, ChartOptions, Derivation};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug)]
pub struct ChartCellFactory {
    policy: CellPolicy,
    hasher: SharedHasher,
}

impl ChartCellFactory {
    /// Create a factory for `options.policy`.
    ///
    /// Policies with [`PolicyTraits::STRUCTURAL_DEDUP`] get a contribution
    /// table built from the grammar's `categories`: one
    /// `max_sentence_length²` slab per argument slot of every category, so
    /// its size grows with both. Other policies never fingerprint and get an
    /// empty table; `categories` is not read.
    pub fn new<'a>(
        options: &ChartOptions,
        categories: impl IntoIterator<Item = &'a Category>,
    ) -> Result<Self, ChartError> {
        options.validate()?;

        let table = if options.policy.traits().contains(PolicyTraits::STRUCTURAL_DEDUP) {
            let mut rng = match options.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            ContributionTable::build(categories, options.max_sentence_length, &mut rng)
        } else {
            ContributionTable::build(std::iter::empty(), options.max_sentence_length, &mut StdRng::seed_from_u64(0))
        };

        tracing::debug!(
            policy = options.policy.name(),
            max_sentence_length = options.max_sentence_length,
            slabs = table.len(),
            "created chart cell factory"
        );

        Ok(ChartCellFactory {
            policy: options.policy,
            hasher: Rc::new(RefCell::new(StructuralHasher::new(Arc::new(table)))),
        })
    }

    /// Create a factory for a policy that does not fingerprint derivations.
    pub fn with_policy(policy: CellPolicy) -> Result<Self, ChartError> {
        if policy.traits().contains(PolicyTraits::STRUCTURAL_DEDUP) {
            return Err(ChartError::InvalidOption {
                name: "policy",
                reason: format!("{} needs the grammar's category set", policy.name()),
            });
        }
        Self::new(&ChartOptions { policy, ..ChartOptions::default() }, std::iter::empty())
    }

    /// A factory with the same policy and table and an empty cache.
    pub fn fork(&self) -> Self {
        let table = Arc::clone(self.hasher.borrow().table());
        ChartCellFactory { policy: self.policy, hasher: Rc::new(RefCell::new(StructuralHasher::new(table))) }
    }

    pub fn policy(&self) -> CellPolicy {
        self.policy
    }

    pub fn max_sentence_length(&self) -> usize {
        self.hasher.borrow().table().max_sentence_length()
    }

    /// A fresh, empty cell.
    pub fn make(&self) -> ChartCell {
        ChartCell::new(self.policy, &self.hasher)
    }

    /// Forget sentence-scoped state. Idempotent; the table is kept.
    pub fn new_sentence(&mut self) {
        self.hasher.borrow_mut().clear();
    }

    /// [`new_sentence`](Self::new_sentence), then check that a sentence of
    /// `length` words fits the contribution table.
    ///
    /// Only policies that fingerprint derivations are length-limited.
    pub fn start_sentence(&mut self, length: usize) -> Result<(), ChartError> {
        self.new_sentence();

        let max = self.max_sentence_length();
        if self.policy.traits().contains(PolicyTraits::STRUCTURAL_DEDUP) && length > max {
            return Err(ChartError::SentenceTooLong { length, max });
        }

        tracing::trace!(policy = self.policy.name(), length, "starting sentence");
        Ok(())
    }

    /// Fingerprint of `derivation` under this factory's table and cache, or
    /// `None` if the policy does not fingerprint derivations.
    ///
    /// # Panics
    ///
    /// Panics on a dependency the table has no term for; see
    /// [`ContributionTable::contribution`].
    pub fn fingerprint(&self, derivation: &Derivation) -> Option<Fingerprint> {
        if !self.policy.traits().contains(PolicyTraits::STRUCTURAL_DEDUP) {
            return None;
        }
        Some(self.hasher.borrow_mut().fingerprint(derivation))
    }

    /// Number of `(category, slot)` slabs in the contribution table.
    pub fn table_slabs(&self) -> usize {
        self.hasher.borrow().table().len()
    }

    /// Number of derivations fingerprinted in the current sentence.
    pub fn cached_fingerprints(&self) -> usize {
        self.hasher.borrow().cached()
    }
}
