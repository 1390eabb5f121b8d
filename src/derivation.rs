//! Derivations and agenda items as the chart sees them.
//!
//! Both are produced elsewhere (rule application, the agenda) and are
//! read-only here: a cell only decides whether to keep a reference.

use crate::Category;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DERIVATION_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of a derivation node.
///
/// Ids are never reused within a process, so a freed derivation can't alias
/// a later one in the hasher's cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DerivationId(u64);

impl DerivationId {
    fn fresh() -> Self {
        DerivationId(NEXT_DERIVATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A resolved, unlabelled dependency: word `head`, through argument `slot` of
/// `category`, takes the words in `arguments`.
///
/// Usually there is exactly one argument; coordination can fill a slot with
/// several words.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnlabelledDependency {
    pub category: Category,
    /// 1-based argument slot of `category`.
    pub slot: usize,
    pub head: usize,
    pub arguments: Vec<usize>,
}

impl UnlabelledDependency {
    pub fn new(category: Category, slot: usize, head: usize, argument: usize) -> Self {
        Self { category, slot, head, arguments: vec![argument] }
    }

    pub fn with_arguments(category: Category, slot: usize, head: usize, arguments: Vec<usize>) -> Self {
        Self { category, slot, head, arguments }
    }
}

/// A (sub)derivation node.
#[derive(Debug)]
pub struct Derivation {
    id: DerivationId,
    category: Category,
    children: Vec<Arc<Derivation>>,
    /// `None` until the dependencies introduced at this node are resolved.
    dependencies: Option<Vec<UnlabelledDependency>>,
}

impl Derivation {
    pub fn new(category: Category, children: Vec<Arc<Derivation>>) -> Self {
        Derivation { id: DerivationId::fresh(), category, children, dependencies: None }
    }

    /// A lexical leaf.
    pub fn leaf(category: Category) -> Self {
        Self::new(category, Vec::new())
    }

    pub fn unary(category: Category, child: Arc<Derivation>) -> Self {
        Self::new(category, vec![child])
    }

    pub fn binary(category: Category, left: Arc<Derivation>, right: Arc<Derivation>) -> Self {
        Self::new(category, vec![left, right])
    }

    /// Attach the dependencies resolved at this node (not its children's).
    pub fn with_dependencies(mut self, dependencies: Vec<UnlabelledDependency>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    pub fn id(&self) -> DerivationId {
        self.id
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn children(&self) -> &[Arc<Derivation>] {
        &self.children
    }

    /// Dependencies resolved at this node, or `None` if never resolved.
    pub fn dependencies(&self) -> Option<&[UnlabelledDependency]> {
        self.dependencies.as_deref()
    }
}

/// Opaque dynamic-programming equivalence key.
///
/// Two items with the same key are interchangeable for everything outside
/// their span. How the key is derived is up to the producer of the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquivalenceKey(pub u64);

impl EquivalenceKey {
    /// Derive a key from any hashable value (e.g. `(category, head)`).
    ///
    /// Deterministic within a build: uses a fixed-seed hasher.
    pub fn of<T: Hash + ?Sized>(value: &T) -> Self {
        let mut hasher = rustc_hash::FxHasher::default();
        value.hash(&mut hasher);
        EquivalenceKey(hasher.finish())
    }
}

impl From<u64> for EquivalenceKey {
    fn from(value: u64) -> Self {
        EquivalenceKey(value)
    }
}

/// A candidate offered to a chart cell.
#[derive(Debug, Clone)]
pub struct AgendaItem {
    derivation: Arc<Derivation>,
    cost: f64,
    inside_score: f64,
    key: EquivalenceKey,
}

impl AgendaItem {
    pub fn new(derivation: Arc<Derivation>, cost: f64, inside_score: f64, key: EquivalenceKey) -> Self {
        AgendaItem { derivation, cost, inside_score, key }
    }

    pub fn derivation(&self) -> &Arc<Derivation> {
        &self.derivation
    }

    /// Lower is better; compared against the beam.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Higher is better; compared by the CKY policy.
    pub fn inside_score(&self) -> f64 {
        self.inside_score
    }

    pub fn equivalence_key(&self) -> EquivalenceKey {
        self.key
    }
}
