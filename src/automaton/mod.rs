//! Finite-state controllers.
//!
//! An [`Automaton`] is the transducer produced by strategy synthesis. Each
//! [`AutomatonState`] is a full snapshot of environment and system variables
//! together with the ids of the states it may move to. At run time the
//! controller is driven by [`Automaton::find_next_state`]: given the current
//! state and the latest environment observation, it picks the successor to
//! move to.
//!
//! # Representation
//!
//! - States are kept in a map ordered by [`StateId`]. Ids may arrive sparse or
//!   out of order while an automaton is being built, and any id is accepted.
//!   An automaton loaded from canonical storage has ids exactly `0..len()`.
//! - Variable names are interned in a per-automaton [`VarTable`], and every
//!   [`Valuation`] is a dense vector with one slot per variable, so valuation
//!   equality and hashing are structural.
//!
//! # Examples
//!
//! ```
//! use hysyn::automaton::Automaton;
//! use hysyn::types::StateId;
//!
//! let mut aut = Automaton::new();
//! aut.add_state(StateId::new(0), [("x", 0), ("y", 1)], [StateId::new(1)]);
//! aut.add_state(StateId::new(1), [("x", 1), ("y", 0)], [StateId::new(0)]);
//!
//! let s0 = aut.state(StateId::new(0)).unwrap();
//! let next = aut.find_next_state(Some(s0), &[("x", 1)]).unwrap();
//! assert_eq!(next.id(), StateId::new(1));
//! ```

pub mod dot;
pub mod reduce;
pub mod text;
pub mod xml;

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;
use log::debug;

use crate::types::{StateId, VarId};

/// Interned variable names of one automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarTable {
    names: Vec<String>,
    index: HashMap<String, VarId>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from names in order; repeated names are interned once.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for name in names {
            table.intern(name.as_ref());
        }
        table
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<VarId> {
        self.index.get(name).copied()
    }

    /// Name of a variable.
    ///
    /// # Panics
    ///
    /// Panics if `var` does not belong to this table.
    pub fn name(&self, var: VarId) -> &str {
        &self.names[var.index()]
    }

    /// Returns the id of `name`, adding it to the table if needed.
    pub fn intern(&mut self, name: &str) -> VarId {
        if let Some(var) = self.get(name) {
            return var;
        }
        let var = VarId::new(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), var);
        var
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &str)> + '_ {
        self.names.iter().enumerate().map(|(i, name)| (VarId::new(i), name.as_str()))
    }
}

/// Assignment of integer values to the variables of a [`VarTable`].
///
/// Unassigned variables are `None`. Two valuations are equal iff they assign
/// the same variables the same values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Valuation {
    values: Vec<Option<i64>>,
}

impl Valuation {
    /// An all-unassigned valuation over `num_vars` variables.
    pub fn unassigned(num_vars: usize) -> Self {
        Self {
            values: vec![None; num_vars],
        }
    }

    pub fn get(&self, var: VarId) -> Option<i64> {
        self.values.get(var.index()).copied().flatten()
    }

    pub fn set(&mut self, var: VarId, value: i64) {
        if var.index() >= self.values.len() {
            self.values.resize(var.index() + 1, None);
        }
        self.values[var.index()] = Some(value);
    }

    /// True if every variable has a value.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Assigned variables with their values, in variable order.
    pub fn assigned(&self) -> impl Iterator<Item = (VarId, i64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (VarId::new(i), v)))
    }

    /// Variables without a value, in variable order.
    pub fn unassigned_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| VarId::new(i))
    }

    fn resize(&mut self, num_vars: usize) {
        self.values.resize(num_vars, None);
    }
}

/// One node of an [`Automaton`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomatonState {
    id: StateId,
    valuation: Valuation,
    transitions: IndexSet<StateId>,
}

impl AutomatonState {
    fn empty(id: StateId, num_vars: usize) -> Self {
        Self {
            id,
            valuation: Valuation::unassigned(num_vars),
            transitions: IndexSet::new(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn valuation(&self) -> &Valuation {
        &self.valuation
    }

    /// Successor ids, without duplicates, in insertion order.
    pub fn transitions(&self) -> &IndexSet<StateId> {
        &self.transitions
    }

    pub fn successors(&self) -> impl Iterator<Item = StateId> + '_ {
        self.transitions.iter().copied()
    }
}

/// A finite-state controller: a set of [`AutomatonState`]s addressed by id.
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    vars: VarTable,
    states: BTreeMap<StateId, AutomatonState>,
}

impl Automaton {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty automaton whose variable table is pre-populated with `names`.
    pub fn with_variables<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            vars: VarTable::from_names(names),
            ..Self::default()
        }
    }

    /// Builds an automaton from copies of `states`, interpreted over `vars`.
    ///
    /// A later state with an id already seen replaces the earlier one.
    pub fn from_states(vars: VarTable, states: &[AutomatonState]) -> Self {
        let mut aut = Self {
            vars,
            ..Self::default()
        };
        for state in states {
            let mut state = state.clone();
            state.valuation.resize(aut.vars.len());
            aut.put(state);
        }
        aut
    }

    pub fn variables(&self) -> &VarTable {
        &self.vars
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// True if the state ids are exactly `0..len()`.
    pub fn is_canonical(&self) -> bool {
        match self.states.keys().next_back() {
            Some(last) => last.index() == self.states.len() - 1,
            None => true,
        }
    }

    pub fn state(&self, id: StateId) -> Option<&AutomatonState> {
        self.states.get(&id)
    }

    /// All states in increasing id order.
    pub fn states(&self) -> impl Iterator<Item = &AutomatonState> + '_ {
        self.states.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    /// Inserts `state`, replacing any state with the same id.
    fn put(&mut self, state: AutomatonState) {
        self.states.insert(state.id, state);
    }

    /// Returns the state with `id`, creating an empty one if it does not exist.
    fn state_mut_or_insert(&mut self, id: StateId) -> &mut AutomatonState {
        let num_vars = self.vars.len();
        self.states.entry(id).or_insert_with(|| {
            debug!("Adding state {}", id);
            AutomatonState::empty(id, num_vars)
        })
    }

    /// Renumbers states to `0..len()`, keeping their id order.
    ///
    /// Successor references follow the renumbering; references to states that
    /// do not exist are dropped. Returns `true` if any id changed.
    pub fn canonicalize(&mut self) -> bool {
        if self.is_canonical() {
            return false;
        }
        let renumber: HashMap<StateId, StateId> = self
            .states
            .keys()
            .enumerate()
            .map(|(i, &id)| (id, StateId::new(i)))
            .collect();
        let states = std::mem::take(&mut self.states);
        for (i, (old, mut state)) in states.into_iter().enumerate() {
            let id = StateId::new(i);
            state.id = id;
            state.transitions = state
                .transitions
                .iter()
                .filter_map(|succ| {
                    let mapped = renumber.get(succ).copied();
                    if mapped.is_none() {
                        debug!("dropping dangling transition {} -> {}", old, succ);
                    }
                    mapped
                })
                .collect();
            self.states.insert(id, state);
        }
        true
    }

    fn intern(&mut self, name: &str) -> VarId {
        let before = self.vars.len();
        let var = self.vars.intern(name);
        if self.vars.len() != before {
            let num_vars = self.vars.len();
            for state in self.states.values_mut() {
                state.valuation.resize(num_vars);
            }
        }
        var
    }

    /// Builds a valuation from `(name, value)` pairs, adding unknown names to the variable table.
    pub fn valuation<I, S>(&mut self, pairs: I) -> Valuation
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let pairs: Vec<(VarId, i64)> = pairs.into_iter().map(|(name, v)| (self.intern(name.as_ref()), v)).collect();
        let mut valuation = Valuation::unassigned(self.vars.len());
        for (var, value) in pairs {
            valuation.set(var, value);
        }
        valuation
    }

    /// Resolves `(name, value)` pairs against the variable table without modifying it.
    ///
    /// Returns `None` if some name is unknown.
    fn resolve(&self, pairs: &[(&str, i64)]) -> Option<Vec<(VarId, i64)>> {
        pairs
            .iter()
            .map(|&(name, value)| self.vars.get(name).map(|var| (var, value)))
            .collect()
    }

    /// Formats a valuation as `name:value` pairs (assigned variables only).
    pub fn format_valuation(&self, valuation: &Valuation) -> String {
        let mut out = String::new();
        for (var, value) in valuation.assigned() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&format!("{}:{}", self.vars.name(var), value));
        }
        out
    }

    /// Inserts or fully replaces the state `id`.
    pub fn add_state<I, S, T>(&mut self, id: StateId, valuation: I, successors: T)
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
        T: IntoIterator<Item = StateId>,
    {
        let valuation = self.valuation(valuation);
        let state = AutomatonState {
            id,
            valuation,
            transitions: successors.into_iter().collect(),
        };
        debug!("Adding state {}: {}", id, self.format_valuation(&state.valuation));
        self.put(state);
    }

    /// Replaces the valuation of state `id`, creating the state if needed.
    pub fn set_state_valuation<I, S>(&mut self, id: StateId, valuation: I)
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let valuation = self.valuation(valuation);
        debug!("Setting state of {}: {}", id, self.format_valuation(&valuation));
        self.state_mut_or_insert(id).valuation = valuation;
    }

    /// Replaces the successor set of state `id`, creating the state if needed.
    pub fn set_transitions<T>(&mut self, id: StateId, successors: T)
    where
        T: IntoIterator<Item = StateId>,
    {
        let transitions: IndexSet<StateId> = successors.into_iter().collect();
        debug!("Setting transitions of {}: {:?}", id, transitions);
        self.state_mut_or_insert(id).transitions = transitions;
    }

    /// First state (in id order) whose valuation is exactly `query`.
    pub fn find(&self, query: &[(&str, i64)]) -> Option<&AutomatonState> {
        self.find_all(query).into_iter().next()
    }

    /// All states whose valuation is exactly `query`, in id order.
    ///
    /// Exact means the same variables are assigned, with the same values.
    pub fn find_all(&self, query: &[(&str, i64)]) -> Vec<&AutomatonState> {
        let Some(pairs) = self.resolve(query) else {
            return Vec::new();
        };
        let mut target = Valuation::unassigned(self.vars.len());
        for (var, value) in pairs {
            target.set(var, value);
        }
        self.states().filter(|s| s.valuation == target).collect()
    }

    /// Next controller state given the current state and an environment observation.
    ///
    /// Candidates are the successors of `current`, or every state (in id order)
    /// when the current state is unknown. The first candidate that agrees with
    /// `env` on all of its variables is returned; variables absent from `env`
    /// are unconstrained. Only the first match is reported even if several match.
    pub fn find_next_state(&self, current: Option<&AutomatonState>, env: &[(&str, i64)]) -> Option<&AutomatonState> {
        let Some(constraints) = self.resolve(env) else {
            debug!("environment mentions unknown variables: {:?}", env);
            return None;
        };
        let candidates: Vec<StateId> = match current {
            Some(state) => state.successors().collect(),
            None => self.ids().collect(),
        };
        candidates
            .into_iter()
            .filter_map(|id| {
                let state = self.state(id);
                if state.is_none() {
                    debug!("skipping missing successor {}", id);
                }
                state
            })
            .find(|state| {
                constraints
                    .iter()
                    .all(|&(var, value)| state.valuation.get(var) == Some(value))
            })
    }
}
