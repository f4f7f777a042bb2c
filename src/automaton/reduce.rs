//! State-count reduction.
//!
//! Two reductions are offered, and they are not interchangeable:
//!
//! - [`Automaton::minimize`] merges only bisimilar states: states with the
//!   same valuation whose successors fall into the same classes, recursively.
//!   The reduced controller allows exactly the runs the original allowed.
//! - [`Automaton::collapse_lossy`] merges every group of states with the same
//!   valuation and unions their successor sets. The result may allow runs the
//!   original did not, so it is a diagnostic tool only.
//!
//! Both leave the automaton canonical (ids `0..len()`), keep the valuation of
//! each class, and drop successor references to states that do not exist.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;
use log::{debug, info};

use crate::automaton::{Automaton, AutomatonState, Valuation};
use crate::types::StateId;

impl Automaton {
    /// Classes of states with equal valuations, numbered by first occurrence.
    fn valuation_classes(&self) -> (HashMap<StateId, usize>, usize) {
        let mut class_of = HashMap::with_capacity(self.len());
        let mut classes: HashMap<&Valuation, usize> = HashMap::new();
        for state in self.states() {
            let next = classes.len();
            let class = *classes.entry(&state.valuation).or_insert(next);
            class_of.insert(state.id, class);
        }
        let num_classes = classes.len();
        (class_of, num_classes)
    }

    /// Replaces the states by one state per class.
    ///
    /// Class indices must be numbered in order of the lowest member id, so that
    /// the lowest member gives its valuation to the class. The successors of a
    /// class are the union of the classes of its members' successors.
    fn quotient(&mut self, class_of: &HashMap<StateId, usize>, num_classes: usize) {
        let mut merged: BTreeMap<StateId, AutomatonState> = BTreeMap::new();
        for state in self.states() {
            let Some(&class) = class_of.get(&state.id) else {
                continue;
            };
            let id = StateId::new(class);
            let target = merged.entry(id).or_insert_with(|| AutomatonState {
                id,
                valuation: state.valuation.clone(),
                transitions: IndexSet::new(),
            });
            for succ in state.successors() {
                match class_of.get(&succ).copied() {
                    Some(c) => {
                        target.transitions.insert(StateId::new(c));
                    }
                    None => debug!("dropping dangling transition {} -> {}", state.id, succ),
                }
            }
        }
        debug_assert_eq!(merged.len(), num_classes);
        self.states = merged;
    }

    /// Merges states with identical valuations, unioning their successors.
    ///
    /// Every group of states sharing a valuation becomes a single state, and
    /// every reference to a group member now points to that state. Ids are
    /// renumbered contiguously in the order of each group's lowest id.
    ///
    /// This can add behaviour: a merged state offers every move any member
    /// offered. Use [`minimize`](Self::minimize) where the controller must stay
    /// equivalent.
    ///
    /// Returns the number of states removed.
    pub fn collapse_lossy(&mut self) -> usize {
        let before = self.len();
        let (class_of, num_classes) = self.valuation_classes();
        self.quotient(&class_of, num_classes);
        info!("collapsed {} states into {} (lossy)", before, self.len());
        before - self.len()
    }

    /// Merges bisimilar states.
    ///
    /// Starts from the classes of equal valuations and splits them until all
    /// members of a class have successors in the same set of classes. The
    /// resulting automaton is renumbered contiguously, in the order of each
    /// class's lowest id.
    ///
    /// Returns the number of states removed.
    pub fn minimize(&mut self) -> usize {
        let before = self.len();
        let (mut class_of, mut num_classes) = self.valuation_classes();

        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut signatures: HashMap<(usize, Vec<usize>), usize> = HashMap::new();
            let mut refined = HashMap::with_capacity(class_of.len());
            for state in self.states() {
                let Some(&class) = class_of.get(&state.id) else {
                    continue;
                };
                let mut succ_classes: Vec<usize> = state
                    .successors()
                    .filter_map(|s| class_of.get(&s).copied())
                    .collect();
                succ_classes.sort_unstable();
                succ_classes.dedup();
                let next = signatures.len();
                let new_class = *signatures.entry((class, succ_classes)).or_insert(next);
                refined.insert(state.id, new_class);
            }
            let refined_count = signatures.len();
            class_of = refined;
            if refined_count == num_classes {
                break;
            }
            num_classes = refined_count;
        }
        debug!("bisimulation stable after {} rounds with {} classes", rounds, num_classes);

        self.quotient(&class_of, num_classes);
        info!("minimized {} states into {}", before, self.len());
        before - self.len()
    }
}
