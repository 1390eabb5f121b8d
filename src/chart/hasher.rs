//! Structural fingerprints for derivations.
//!
//! N-best cells want to know whether a new derivation is "the same analysis"
//! as one they already hold: same resolved dependencies, possibly different
//! bracketing. Comparing trees is linear in their size and would run on every
//! admission, so derivations are summarised by a Zobrist-style fingerprint
//! instead:
//!
//! ```text
//! fingerprint(node) = XOR over node deps d, over arguments a of d, a != d.head:
//!                         table[d.category, d.slot][d.head][a]
//!                   ^ XOR over children c: fingerprint(c)
//! ```
//!
//! Every `(category, slot, head, argument)` term is an independent random
//! `u64`, so two derivations with the same dependency set collide by
//! construction and different sets collide with probability about 2^-64.
//!
//! ## Known collisions
//!
//! XOR cancels pairs: two derivations whose dependency multisets differ only
//! by an even number of repeats of the same term get the same fingerprint.
//! Such derivations are treated as duplicates by the n-best cells.
//!
//! ## Sentence scope
//!
//! The table is indexed by sentence-relative word positions and is built once.
//! The per-derivation cache is only meaningful for the sentence in flight and
//! is cleared by [`StructuralHasher::clear`].

use crate::{Category, Derivation, DerivationId};
use rand::Rng;
use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::{BitXor, BitXorAssign};
use std::sync::Arc;

/// A structural fingerprint. `Fingerprint::ZERO` is the XOR identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    pub const ZERO: Fingerprint = Fingerprint(0);
}

impl BitXor for Fingerprint {
    type Output = Fingerprint;

    fn bitxor(self, rhs: Fingerprint) -> Fingerprint {
        Fingerprint(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Fingerprint {
    fn bitxor_assign(&mut self, rhs: Fingerprint) {
        self.0 ^= rhs.0;
    }
}

/// Random contributions per `(category, argument slot)`, each a
/// `max_sentence_length × max_sentence_length` slab indexed by
/// `(head, argument)`.
///
/// Immutable once built; shared between factories via `Arc`.
pub struct ContributionTable {
    max_sentence_length: usize,
    slabs: FxHashMap<(Category, usize), Box<[u64]>>,
}

impl ContributionTable {
    /// Build a table with one slab per argument slot of every category.
    ///
    /// Atomic categories take no arguments and get no slab. Duplicate
    /// categories in `categories` are built once.
    pub fn build<'a, R: Rng>(
        categories: impl IntoIterator<Item = &'a Category>,
        max_sentence_length: usize,
        rng: &mut R,
    ) -> Self {
        let cells = max_sentence_length * max_sentence_length;
        let mut slabs = FxHashMap::default();

        for category in categories {
            for slot in 1..=category.number_of_arguments() {
                slabs
                    .entry((category.clone(), slot))
                    .or_insert_with(|| (0..cells).map(|_| rng.r#gen::<u64>()).collect::<Box<[u64]>>());
            }
        }

        tracing::debug!(slabs = slabs.len(), max_sentence_length, "built dependency contribution table");
        ContributionTable { max_sentence_length, slabs }
    }

    pub fn max_sentence_length(&self) -> usize {
        self.max_sentence_length
    }

    /// Number of `(category, slot)` slabs.
    pub fn len(&self) -> usize {
        self.slabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }

    /// Whether `(category, slot)` has a slab.
    pub fn contains(&self, category: &Category, slot: usize) -> bool {
        self.slabs.contains_key(&(category.clone(), slot))
    }

    /// The random term for one filled argument.
    ///
    /// # Panics
    ///
    /// Panics if `(category, slot)` has no slab, i.e. the category is not in
    /// the grammar's category set or `slot` exceeds its argument count.
    ///
    /// Panics if `head` or `argument` is not below `max_sentence_length`.
    /// Sentence length is validated when a sentence starts, so reaching this
    /// means the table was sized wrongly for the input.
    pub fn contribution(&self, category: &Category, slot: usize, head: usize, argument: usize) -> u64 {
        let Some(slab) = self.slabs.get(&(category.clone(), slot)) else {
            panic!("dependency {category} slot {slot} has no entry in the contribution table");
        };
        let max = self.max_sentence_length;
        assert!(
            head < max && argument < max,
            "dependency {head}->{argument} outside contribution table sized for {max} words",
        );
        slab[head * max + argument]
    }
}

impl fmt::Debug for ContributionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContributionTable")
            .field("max_sentence_length", &self.max_sentence_length)
            .field("slabs", &self.slabs.len())
            .finish()
    }
}

/// Memoizing fingerprint computation for one sentence at a time.
#[derive(Debug)]
pub struct StructuralHasher {
    table: Arc<ContributionTable>,
    cache: FxHashMap<DerivationId, Fingerprint>,
}

impl StructuralHasher {
    pub fn new(table: Arc<ContributionTable>) -> Self {
        StructuralHasher { table, cache: FxHashMap::default() }
    }

    pub fn table(&self) -> &Arc<ContributionTable> {
        &self.table
    }

    /// Fingerprint of `derivation`, computed once per derivation per sentence.
    ///
    /// Self-dependencies (`head == argument`) contribute nothing. A node whose
    /// dependencies were never resolved contributes only its children.
    ///
    /// # Panics
    ///
    /// Panics on a dependency the table has no term for; see
    /// [`ContributionTable::contribution`].
    pub fn fingerprint(&mut self, derivation: &Derivation) -> Fingerprint {
        if let Some(&cached) = self.cache.get(&derivation.id()) {
            return cached;
        }

        let mut result = Fingerprint::ZERO;
        if let Some(dependencies) = derivation.dependencies() {
            for dep in dependencies {
                for &argument in &dep.arguments {
                    if dep.head == argument {
                        continue;
                    }
                    result ^= Fingerprint(self.table.contribution(&dep.category, dep.slot, dep.head, argument));
                }
            }
        }

        for child in derivation.children() {
            result ^= self.fingerprint(child);
        }

        self.cache.insert(derivation.id(), result);
        result
    }

    /// Number of cached derivations.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Forget every cached fingerprint. The table is kept.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
