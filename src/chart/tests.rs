use crate::{
    AgendaItem, Category, CellPolicy, Chart, ChartCellFactory, ChartOptions, Derivation, EquivalenceKey, Fingerprint,
    UnlabelledDependency,
};
use std::sync::Arc;

fn cat(text: &str) -> Category {
    text.parse().unwrap()
}

fn grammar() -> Vec<Category> {
    ["N", "NP", "NP/N", "(S\\NP)/NP", "(S\\NP)\\(S\\NP)", "(NP\\NP)/NP", "((S\\NP)\\(S\\NP))/NP"]
        .iter()
        .map(|c| cat(c))
        .collect()
}

fn factory(policy: CellPolicy) -> ChartCellFactory {
    let options = ChartOptions { policy, max_sentence_length: 12, seed: Some(2013) };
    ChartCellFactory::new(&options, &grammar()).unwrap()
}

fn leaf(category: &str) -> Arc<Derivation> {
    Arc::new(Derivation::leaf(cat(category)))
}

fn entry(key: u64, cost: f64, inside_score: f64) -> AgendaItem {
    AgendaItem::new(leaf("NP"), cost, inside_score, EquivalenceKey(key))
}

fn same(a: &AgendaItem, b: &AgendaItem) -> bool {
    Arc::ptr_eq(a.derivation(), b.derivation())
}

// --- Best-wins-first ---------------------------------------------------------

#[test]
fn first_arrival_wins_regardless_of_cost() {
    for policy in [CellPolicy::OneBest, CellPolicy::OneBestOrdered] {
        let mut cell = factory(policy).make();
        let a = entry(1, 9.0, -9.0);
        let b = entry(1, 1.0, 5.0);

        assert!(cell.add(a.clone()));
        assert!(!cell.add(b.clone()));

        let entries = cell.entries();
        assert_eq!(entries.len(), 1);
        assert!(same(entries[0], &a));
        assert!(!same(entries[0], &b));
        assert_eq!(cell.stats().rejected_occupied, 1);
    }
}

#[test]
fn one_best_keeps_one_entry_per_key() {
    let mut cell = factory(CellPolicy::OneBest).make();
    for key in 0..5 {
        assert!(cell.add(entry(key, 1.0, 0.0)));
        assert!(!cell.add(entry(key, 0.5, 1.0)));
    }
    assert_eq!(cell.size(), 5);
}

// --- Best-wins-by-score ------------------------------------------------------

#[test]
fn cky_replaces_only_on_strictly_better_inside_score() {
    let mut cell = factory(CellPolicy::OneBestCky).make();
    let a = entry(1, 0.0, 1.0);
    let b = entry(1, 0.0, 2.0);
    let c = entry(1, 0.0, 2.0);

    assert!(cell.add(a));
    assert!(cell.add(b.clone()));
    assert!(!cell.add(c.clone()));

    let kept = cell.entries_for(EquivalenceKey(1));
    assert_eq!(kept.len(), 1);
    assert!(same(kept[0], &b));
    assert!(!same(kept[0], &c));
    assert_eq!(cell.size(), 1);
}

// --- Bounded n-best ----------------------------------------------------------

#[test]
fn nbest_applies_relative_beam_to_first_entry() {
    let mut cell = factory(CellPolicy::NBest { nbest: 2, beam: 0.5 }).make();
    assert!(cell.add(entry(1, 10.0, 0.0)));
    assert!(cell.add(entry(1, 6.0, 0.0)));
    assert!(!cell.add(entry(1, 4.0, 0.0)));
    assert_eq!(cell.size(), 2);
    assert_eq!(cell.entries_for(EquivalenceKey(1)).len(), 2);
    assert_eq!(cell.stats().rejected_beam, 1);
}

#[test]
fn nbest_beam_boundary_is_inclusive() {
    let mut cell = factory(CellPolicy::NBest { nbest: 5, beam: 0.5 }).make();
    assert!(cell.add(entry(1, 10.0, 0.0)));
    assert!(cell.add(entry(1, 5.0, 0.0)));
}

#[test]
fn nbest_admits_nbest_plus_one() {
    let mut cell = factory(CellPolicy::NBest { nbest: 2, beam: 0.5 }).make();
    for _ in 0..3 {
        assert!(cell.add(entry(1, 10.0, 0.0)));
    }
    assert!(!cell.add(entry(1, 10.0, 0.0)));
    assert_eq!(cell.size(), 3);
    assert_eq!(cell.stats().rejected_count, 1);
}

#[test]
fn nbest_keeps_arrival_order_within_key() {
    let mut cell = factory(CellPolicy::NBest { nbest: 3, beam: 0.1 }).make();
    for cost in [10.0, 12.0, 8.0, 30.0] {
        assert!(cell.add(entry(7, cost, 0.0)));
    }
    let costs: Vec<f64> = cell.entries_for(EquivalenceKey(7)).iter().map(|e| e.cost()).collect();
    assert_eq!(costs, vec![10.0, 12.0, 8.0, 30.0]);
}

// --- Structural deduplication ------------------------------------------------

/// "John saw Mary with binoculars", with the PP attached to the verb phrase.
/// Both derivations resolve the same dependencies, bracketed differently.
fn attachment_pair() -> (Arc<Derivation>, Arc<Derivation>, Vec<UnlabelledDependency>) {
    let verb = cat("(S\\NP)/NP");
    let prep = cat("((S\\NP)\\(S\\NP))/NP");
    let deps = vec![
        UnlabelledDependency::new(verb.clone(), 1, 1, 0),
        UnlabelledDependency::new(verb, 2, 1, 2),
        UnlabelledDependency::new(prep.clone(), 2, 3, 1),
        UnlabelledDependency::new(prep, 3, 3, 4),
    ];

    // [[saw Mary] [with binoculars]] with all dependencies resolved at the root.
    let vp = Arc::new(Derivation::binary(cat("S\\NP"), leaf("(S\\NP)/NP"), leaf("NP")));
    let pp = Arc::new(Derivation::binary(cat("(S\\NP)\\(S\\NP)"), leaf("((S\\NP)\\(S\\NP))/NP"), leaf("NP")));
    let flat = Arc::new(Derivation::binary(cat("S\\NP"), vp, pp).with_dependencies(deps.clone()));

    // Same dependencies, resolved at the nodes that introduce them.
    let vp = Arc::new(
        Derivation::binary(cat("S\\NP"), leaf("(S\\NP)/NP"), leaf("NP")).with_dependencies(vec![deps[1].clone()]),
    );
    let pp = Arc::new(
        Derivation::binary(cat("(S\\NP)\\(S\\NP)"), leaf("((S\\NP)\\(S\\NP))/NP"), leaf("NP"))
            .with_dependencies(vec![deps[3].clone()]),
    );
    let nested =
        Arc::new(Derivation::binary(cat("S\\NP"), vp, pp).with_dependencies(vec![deps[0].clone(), deps[2].clone()]));

    (flat, nested, deps)
}

#[test]
fn equivalent_derivations_share_a_fingerprint() {
    let factory = factory(CellPolicy::NBestHashed { nbest: 3, beam: 0.5 });
    let (flat, nested, _) = attachment_pair();
    assert_ne!(flat.id(), nested.id());
    assert_eq!(factory.fingerprint(&flat), factory.fingerprint(&nested));
    assert_ne!(factory.fingerprint(&flat), Some(Fingerprint::ZERO));
}

#[test]
fn structural_duplicates_are_rejected_and_distinct_analyses_kept() {
    let mut factory = factory(CellPolicy::NBestHashed { nbest: 3, beam: 0.5 });
    factory.start_sentence(5).unwrap();
    let mut cell = factory.make();
    let (flat, nested, deps) = attachment_pair();
    let key = EquivalenceKey(42);

    assert!(cell.add(AgendaItem::new(flat, 10.0, 0.0, key)));
    // Passes count and beam, but is the same analysis.
    assert!(!cell.add(AgendaItem::new(nested, 10.0, 0.0, key)));
    assert_eq!(cell.stats().rejected_duplicate, 1);

    // NP attachment: "with" now modifies "Mary" instead of the verb phrase.
    let np_prep = cat("(NP\\NP)/NP");
    let mut changed = deps;
    changed[2] = UnlabelledDependency::new(np_prep, 1, 3, 2);
    let vp = Arc::new(Derivation::binary(cat("S\\NP"), leaf("(S\\NP)/NP"), leaf("NP")));
    let other = Arc::new(Derivation::unary(cat("S\\NP"), vp).with_dependencies(changed));

    assert!(cell.add(AgendaItem::new(other, 9.0, 0.0, key)));
    assert_eq!(cell.size(), 2);
}

#[test]
fn duplicates_are_detected_per_key() {
    let mut factory = factory(CellPolicy::NBestHashed { nbest: 3, beam: 0.5 });
    factory.start_sentence(5).unwrap();
    let mut cell = factory.make();
    let (flat, nested, _) = attachment_pair();

    assert!(cell.add(AgendaItem::new(flat, 10.0, 0.0, EquivalenceKey(1))));
    assert!(cell.add(AgendaItem::new(nested, 10.0, 0.0, EquivalenceKey(2))));
}

#[test]
fn hashed_nbest_still_applies_count_and_beam_first() {
    let mut cell = factory(CellPolicy::NBestHashed { nbest: 2, beam: 0.5 }).make();
    assert!(cell.add(entry(1, 10.0, 0.0)));
    // Different leaves, same (empty) structure: duplicates.
    assert!(!cell.add(entry(1, 6.0, 0.0)));
    // Beam rejection wins over the duplicate check.
    assert!(!cell.add(entry(1, 4.0, 0.0)));
    let stats = cell.stats();
    assert_eq!(stats.rejected_duplicate, 1);
    assert_eq!(stats.rejected_beam, 1);
}

#[test]
#[should_panic(expected = "has no entry in the contribution table")]
fn dependencies_outside_the_grammar_are_not_silently_dropped() {
    let mut factory = factory(CellPolicy::NBestHashed { nbest: 3, beam: 0.5 });
    factory.start_sentence(5).unwrap();
    let mut cell = factory.make();
    let key = EquivalenceKey(9);

    // "(S\NP)/PP" is not in the grammar. Dropping its terms would fingerprint
    // both analyses to zero and reject the second as a duplicate.
    let pp_verb = cat("(S\\NP)/PP");
    let to_three = Arc::new(
        Derivation::leaf(cat("S\\NP")).with_dependencies(vec![UnlabelledDependency::new(pp_verb.clone(), 2, 1, 3)]),
    );
    let to_four =
        Arc::new(Derivation::leaf(cat("S\\NP")).with_dependencies(vec![UnlabelledDependency::new(pp_verb, 2, 1, 4)]));

    cell.add(AgendaItem::new(to_three, 10.0, 0.0, key));
    cell.add(AgendaItem::new(to_four, 10.0, 0.0, key));
}

// --- Unbounded ---------------------------------------------------------------

#[test]
fn unbounded_keeps_everything_in_order() {
    let mut cell = factory(CellPolicy::Unbounded).make();
    let offered: Vec<AgendaItem> = (0..6).map(|i| entry(1, f64::from(i), 0.0)).collect();
    for item in &offered {
        assert!(cell.add(item.clone()));
    }
    assert_eq!(cell.size(), offered.len());
    for (kept, sent) in cell.entries().into_iter().zip(&offered) {
        assert!(same(kept, sent));
    }
}

// --- Sentence lifecycle ------------------------------------------------------

#[test]
fn new_sentence_is_idempotent() {
    let (flat, _, _) = attachment_pair();

    let mut once = factory(CellPolicy::NBestHashed { nbest: 1, beam: 1.0 });
    let mut twice = factory(CellPolicy::NBestHashed { nbest: 1, beam: 1.0 });
    let expected = once.fingerprint(&flat);

    once.new_sentence();
    twice.new_sentence();
    twice.new_sentence();
    assert_eq!(once.cached_fingerprints(), 0);
    assert_eq!(twice.cached_fingerprints(), 0);

    let fresh = Arc::new(Derivation::unary(cat("S\\NP"), flat));
    assert_eq!(once.fingerprint(&fresh), expected);
    assert_eq!(twice.fingerprint(&fresh), expected);
}

#[test]
fn new_sentence_before_first_sentence_is_harmless() {
    let mut factory = factory(CellPolicy::NBestHashed { nbest: 1, beam: 1.0 });
    factory.new_sentence();
    assert!(factory.make().is_empty());
}

#[test]
fn bare_leaf_fingerprints_to_zero_for_any_category() {
    let factory = factory(CellPolicy::NBestHashed { nbest: 1, beam: 1.0 });
    for category in grammar() {
        assert_eq!(factory.fingerprint(&Derivation::leaf(category)), Some(Fingerprint::ZERO));
    }
}

#[test]
fn charts_span_sentences_on_one_factory() {
    let mut factory = factory(CellPolicy::NBestHashed { nbest: 2, beam: 0.5 });
    let (flat, nested, _) = attachment_pair();

    let mut first = Chart::new(&mut factory, 5).unwrap();
    assert!(first.add(1, 5, AgendaItem::new(flat, 1.0, 0.0, EquivalenceKey(3))).unwrap());
    assert!(factory.cached_fingerprints() > 0);
    drop(first);

    let mut second = Chart::new(&mut factory, 5).unwrap();
    assert_eq!(factory.cached_fingerprints(), 0);
    assert!(second.add(1, 5, AgendaItem::new(nested, 1.0, 0.0, EquivalenceKey(3))).unwrap());

    assert!(Chart::new(&mut factory, 13).is_err());
}
