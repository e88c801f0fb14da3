// Copyright (C) 2019-2026 The LRX Team.
// This file is part of the lrx rule compiler.

// The lrx rule compiler is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The lrx rule compiler is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the lrx rule compiler. If not, see <https://www.gnu.org/licenses/>.

//! C2 — the transducer builder.
//!
//! A [`Transducer`] is a directed multi-graph of integer states
//! connected by pair-labelled transitions, with one initial state and a
//! set of final states. The rule translator (`lrx-compile`) is the only
//! caller that mutates one; every mutation goes through the operations
//! below.

#![forbid(unsafe_code)]

mod minimise;
mod render;
mod serialize;

pub use render::render;
pub use serialize::serialize;

use lrx_alphabet::{PairId, EPSILON_PAIR};
use std::collections::BTreeSet;

/// A state id, unique within one [`Transducer`].
pub type State = u32;

/// A directed, pair-labelled multi-graph with one initial state and a
/// set of final states (§3, §4.2).
#[derive(Clone)]
pub struct Transducer {
    transitions: Vec<Vec<(PairId, State)>>,
    finals: BTreeSet<State>,
    initial: State,
}

impl Default for Transducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transducer {
    /// A transducer with a single, non-final initial state.
    pub fn new() -> Self {
        Transducer { transitions: vec![Vec::new()], finals: BTreeSet::new(), initial: 0 }
    }

    pub fn initial(&self) -> State {
        self.initial
    }

    pub fn set_final(&mut self, state: State) {
        self.finals.insert(state);
    }

    pub fn is_final(&self, state: State) -> bool {
        self.finals.contains(&state)
    }

    pub fn finals(&self) -> impl Iterator<Item = State> + '_ {
        self.finals.iter().copied()
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.transitions.len()
    }

    /// Total number of transitions, across all states.
    pub fn transition_count(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }

    pub fn transitions_from(&self, state: State) -> &[(PairId, State)] {
        &self.transitions[state as usize]
    }

    fn new_state(&mut self) -> State {
        let id = self.transitions.len() as State;
        self.transitions.push(Vec::new());
        id
    }

    /// Always creates a new destination state and a transition from
    /// `state` labelled `pair`. The rule translator does not rely on
    /// transition reuse for correctness, so this never collapses.
    pub fn new_state_after(&mut self, state: State, pair: PairId) -> State {
        let dst = self.new_state();
        self.transitions[state as usize].push((pair, dst));
        dst
    }

    /// Like [`Transducer::new_state_after`]; the implementer may choose
    /// to collapse into an existing equivalent successor, but this
    /// builder always creates a fresh state (simplicity over sharing —
    /// `minimise` recovers any sharing that matters).
    pub fn step(&mut self, state: State, pair: PairId) -> State {
        self.new_state_after(state, pair)
    }

    /// Adds a transition labelled `pair` from `src` to `dst` without
    /// creating new states. Used to form loops and `or`-branch merges.
    pub fn link(&mut self, src: State, dst: State, pair: PairId) {
        self.transitions[src as usize].push((pair, dst));
    }

    /// Builds the "emit one step, then epsilon-link back" repetition
    /// idiom, plus an epsilon bypass so the loop is zero-or-more rather
    /// than one-or-more (see `DESIGN.md` for why the bypass edge is
    /// needed beyond the bare step-and-link-back shape).
    pub fn self_loop(&mut self, state: State, pair: PairId) -> State {
        let next = self.step(state, pair);
        self.link(next, state, EPSILON_PAIR);
        self.link(state, next, EPSILON_PAIR);
        next
    }

    /// Copies `sub`'s states into `self`, connects `entry` to `sub`'s
    /// initial state via epsilon, and returns a fresh exit state reached
    /// via epsilon from each of `sub`'s finals. `sub`'s states are never
    /// reused by `self` — they are copied at a fresh offset.
    pub fn splice(&mut self, entry: State, sub: &Transducer) -> State {
        let offset = self.transitions.len() as State;
        for transitions in &sub.transitions {
            let remapped = transitions.iter().map(|&(pair, dst)| (pair, dst + offset)).collect();
            self.transitions.push(remapped);
        }
        self.link(entry, sub.initial + offset, EPSILON_PAIR);

        let exit = self.new_state();
        for final_state in &sub.finals {
            self.link(final_state + offset, exit, EPSILON_PAIR);
        }
        exit
    }

    /// Mutates `self` so its language additionally contains the empty
    /// string, by marking the initial state final.
    pub fn make_optional(&mut self) {
        self.finals.insert(self.initial);
    }

    /// Hopcroft/Moore-style minimisation: contract epsilon transitions,
    /// drop unreachable states, then merge bisimilar states. See
    /// `minimise.rs` for the algorithm and its idempotence argument
    /// (P4).
    pub fn minimise(&mut self) {
        minimise::minimise(self);
    }

    /// A structural hash over initial state, finals, and transitions.
    /// Two transducers built from differently-shaped subtrees almost
    /// never collide; used to tell a benign recogniser key re-register
    /// (same shape, rebuilt identically) apart from a real collision
    /// between two distinct rule constructions (§9's recogniser-key
    /// collision warning).
    pub fn fingerprint(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.initial.hash(&mut hasher);
        self.finals.hash(&mut hasher);
        for transitions in &self.transitions {
            let mut sorted = transitions.clone();
            sorted.sort_unstable();
            sorted.hash(&mut hasher);
        }
        hasher.finish()
    }
}
