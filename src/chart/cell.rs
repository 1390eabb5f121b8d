//! Chart cells.
//!
//! A `ChartCell` holds the surviving items for one span of one sentence. The
//! agenda offers items with [`ChartCell::add`]; the cell's [`CellPolicy`]
//! decides whether each one is kept:
//!
//! ```text
//! agenda ──add(item)──▶ key = item.equivalence_key()
//!                          │
//!                          ▼
//!                 policy admission (per key)
//!                    │              │
//!                  true           false  (cell unchanged)
//! ```
//!
//! Retained items are never mutated. The only changes a policy makes are
//! appending an item under a key or, for `OneBestCky`, replacing the item held
//! for a key.
//!
//! See `policy.rs` for the best-first precondition most policies rely on.

use super::hasher::{Fingerprint, StructuralHasher};
use super::metrics::{AdmissionStats, Rejection};
use super::policy::CellPolicy;
use crate::{AgendaItem, EquivalenceKey};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

/// Hasher shared between a factory and the hashing cells it made.
pub(crate) type SharedHasher = Rc<RefCell<StructuralHasher>>;

#[derive(Debug)]
enum CellStore {
    OneBest(FxHashMap<EquivalenceKey, AgendaItem>),
    OneBestOrdered(BTreeMap<EquivalenceKey, AgendaItem>),
    OneBestCky(FxHashMap<EquivalenceKey, AgendaItem>),
    NBest { nbest: usize, beam: f64, entries: IndexMap<EquivalenceKey, Vec<AgendaItem>> },
    NBestHashed {
        nbest: usize,
        beam: f64,
        entries: IndexMap<EquivalenceKey, Vec<AgendaItem>>,
        fingerprints: FxHashMap<EquivalenceKey, FxHashSet<Fingerprint>>,
        hasher: SharedHasher,
    },
    Unbounded(Vec<AgendaItem>),
}

/// Per-span container of retained agenda items.
#[derive(Debug)]
pub struct ChartCell {
    policy: CellPolicy,
    store: CellStore,
    stats: AdmissionStats,
}

impl ChartCell {
    pub(crate) fn new(policy: CellPolicy, hasher: &SharedHasher) -> Self {
        let store = match policy {
            CellPolicy::OneBest => CellStore::OneBest(FxHashMap::default()),
            CellPolicy::OneBestOrdered => CellStore::OneBestOrdered(BTreeMap::new()),
            CellPolicy::OneBestCky => CellStore::OneBestCky(FxHashMap::default()),
            CellPolicy::NBest { nbest, beam } => CellStore::NBest { nbest, beam, entries: IndexMap::new() },
            CellPolicy::NBestHashed { nbest, beam } => CellStore::NBestHashed {
                nbest,
                beam,
                entries: IndexMap::new(),
                fingerprints: FxHashMap::default(),
                hasher: Rc::clone(hasher),
            },
            CellPolicy::Unbounded => CellStore::Unbounded(Vec::new()),
        };
        ChartCell { policy, store, stats: AdmissionStats::default() }
    }

    pub fn policy(&self) -> CellPolicy {
        self.policy
    }

    /// Offer `item` under its own equivalence key.
    ///
    /// Returns `true` if the item was retained, `false` if the cell is
    /// unchanged. For every policy except `OneBestCky` and `Unbounded` the
    /// caller must offer the items of a key best-first.
    pub fn add(&mut self, item: AgendaItem) -> bool {
        let key = item.equivalence_key();
        self.add_with_key(key, item)
    }

    /// Offer `item` under an explicit `key`.
    pub fn add_with_key(&mut self, key: EquivalenceKey, item: AgendaItem) -> bool {
        let outcome = admit(&mut self.store, key, item);
        if crate::debug_enabled() {
            tracing::debug!(policy = self.policy.name(), ?key, ?outcome, "chart cell admission");
        }
        match outcome {
            Ok(replaced) => {
                self.stats.record_admitted(replaced);
                true
            }
            Err(why) => {
                self.stats.record_rejected(why);
                false
            }
        }
    }

    /// Snapshot of the retained items.
    ///
    /// Order: arrival order for `Unbounded`; key order for `OneBestOrdered`;
    /// first-seen key order, then arrival order within a key, for the n-best
    /// policies; unspecified otherwise.
    pub fn entries(&self) -> Vec<&AgendaItem> {
        match &self.store {
            CellStore::OneBest(map) | CellStore::OneBestCky(map) => map.values().collect(),
            CellStore::OneBestOrdered(map) => map.values().collect(),
            CellStore::NBest { entries, .. } | CellStore::NBestHashed { entries, .. } => {
                entries.values().flatten().collect()
            }
            CellStore::Unbounded(items) => items.iter().collect(),
        }
    }

    /// Retained items for one key, in the order `entries()` yields them.
    pub fn entries_for(&self, key: EquivalenceKey) -> Vec<&AgendaItem> {
        match &self.store {
            CellStore::OneBest(map) | CellStore::OneBestCky(map) => map.get(&key).into_iter().collect(),
            CellStore::OneBestOrdered(map) => map.get(&key).into_iter().collect(),
            CellStore::NBest { entries, .. } | CellStore::NBestHashed { entries, .. } => {
                entries.get(&key).map(|list| list.iter().collect()).unwrap_or_default()
            }
            CellStore::Unbounded(items) => items.iter().filter(|item| item.equivalence_key() == key).collect(),
        }
    }

    /// Number of retained items.
    pub fn size(&self) -> usize {
        match &self.store {
            CellStore::OneBest(map) | CellStore::OneBestCky(map) => map.len(),
            CellStore::OneBestOrdered(map) => map.len(),
            CellStore::NBest { entries, .. } | CellStore::NBestHashed { entries, .. } => {
                entries.values().map(Vec::len).sum()
            }
            CellStore::Unbounded(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn stats(&self) -> AdmissionStats {
        self.stats
    }
}

/// Run the policy. `Ok(replaced)` on admission.
fn admit(store: &mut CellStore, key: EquivalenceKey, item: AgendaItem) -> Result<bool, Rejection> {
    match store {
        CellStore::OneBest(map) => match map.entry(key) {
            Entry::Occupied(_) => Err(Rejection::Occupied),
            Entry::Vacant(slot) => {
                slot.insert(item);
                Ok(false)
            }
        },
        CellStore::OneBestOrdered(map) => match map.entry(key) {
            std::collections::btree_map::Entry::Occupied(_) => Err(Rejection::Occupied),
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(item);
                Ok(false)
            }
        },
        CellStore::OneBestCky(map) => match map.entry(key) {
            Entry::Occupied(mut current) => {
                if item.inside_score() > current.get().inside_score() {
                    current.insert(item);
                    Ok(true)
                } else {
                    Err(Rejection::NotBetter)
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(item);
                Ok(false)
            }
        },
        CellStore::NBest { nbest, beam, entries } => {
            let list = entries.entry(key).or_default();
            within_beam(list, &item, *nbest, *beam)?;
            list.push(item);
            Ok(false)
        }
        CellStore::NBestHashed { nbest, beam, entries, fingerprints, hasher } => {
            let list = entries.entry(key).or_default();
            within_beam(list, &item, *nbest, *beam)?;

            let fingerprint = hasher.borrow_mut().fingerprint(item.derivation());
            let seen = fingerprints.entry(key).or_default();
            if !seen.insert(fingerprint) {
                return Err(Rejection::Duplicate);
            }
            list.push(item);
            Ok(false)
        }
        CellStore::Unbounded(items) => {
            items.push(item);
            Ok(false)
        }
    }
}

/// Count and relative-beam test shared by the n-best policies.
///
/// The count test is `len > nbest`, not `>=`: a key can hold `nbest + 1`
/// items. The beam is anchored at the key's first item.
fn within_beam(list: &[AgendaItem], item: &AgendaItem, nbest: usize, beam: f64) -> Result<(), Rejection> {
    if list.len() > nbest {
        return Err(Rejection::Count);
    }
    match list.first() {
        Some(first) if item.cost() < beam * first.cost() => Err(Rejection::Beam),
        _ => Ok(()),
    }
}
