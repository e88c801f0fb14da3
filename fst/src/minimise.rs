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

//! Standard FST minimisation (§4.2, §8 P4), kept deliberately to three
//! safe, language-preserving passes rather than a full Hopcroft
//! powerset determinization:
//!
//! 1. epsilon contraction — fold epsilon-only reachability into the
//!    non-epsilon transitions of each state;
//! 2. dead-state removal — drop states unreachable from the initial
//!    state;
//! 3. bisimulation partition refinement (Moore's algorithm) — merge
//!    states that are provably interchangeable.
//!
//! Merging bisimilar states never changes the accepted language,
//! regardless of whether the graph is deterministic, which is what
//! makes step 3 safe to apply to the `or`/`repeat` branching this
//! compiler emits. Re-running the whole pipeline on its own output is a
//! no-op: contraction finds no epsilon edges left (none survive step 1),
//! every state is already reachable, and partition refinement starts
//! from singleton-distinguishable blocks and finds no further split —
//! satisfying P4.

use super::{State, Transducer};
use lrx_alphabet::{PairId, EPSILON_PAIR};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

pub fn minimise(t: &mut Transducer) {
    let (transitions, finals) = contract_epsilons(t);
    let (transitions, finals, initial) = drop_unreachable(&transitions, &finals, t.initial);
    let (transitions, finals, initial) = refine(&transitions, &finals, initial);

    t.transitions = transitions;
    t.finals = finals;
    t.initial = initial;
}

fn epsilon_closure(transitions: &[Vec<(PairId, State)>], start: State) -> BTreeSet<State> {
    let mut closure = BTreeSet::new();
    let mut queue = VecDeque::new();
    closure.insert(start);
    queue.push_back(start);
    while let Some(s) = queue.pop_front() {
        for &(pair, dst) in &transitions[s as usize] {
            if pair == EPSILON_PAIR && closure.insert(dst) {
                queue.push_back(dst);
            }
        }
    }
    closure
}

/// Rewrites every state's transitions to the non-epsilon transitions
/// reachable through its epsilon closure, and its finality to "any
/// state in the closure is final". The resulting graph has no epsilon
/// transitions left and the same state count as the input.
fn contract_epsilons(t: &Transducer) -> (Vec<Vec<(PairId, State)>>, BTreeSet<State>) {
    let n = t.transitions.len();
    let mut new_transitions = vec![BTreeSet::new(); n];
    let mut new_finals = BTreeSet::new();

    for s in 0..n as State {
        let closure = epsilon_closure(&t.transitions, s);
        if closure.iter().any(|c| t.finals.contains(c)) {
            new_finals.insert(s);
        }
        for &c in &closure {
            for &(pair, dst) in &t.transitions[c as usize] {
                if pair != EPSILON_PAIR {
                    new_transitions[s as usize].insert((pair, dst));
                }
            }
        }
    }

    (new_transitions.into_iter().map(|set| set.into_iter().collect()).collect(), new_finals)
}

/// Drops states unreachable from `initial` and remaps the remaining
/// ones to a dense `0..n` range, preserving relative order.
fn drop_unreachable(
    transitions: &[Vec<(PairId, State)>],
    finals: &BTreeSet<State>,
    initial: State,
) -> (Vec<Vec<(PairId, State)>>, BTreeSet<State>, State) {
    let mut reachable = BTreeSet::new();
    let mut queue = VecDeque::new();
    reachable.insert(initial);
    queue.push_back(initial);
    while let Some(s) = queue.pop_front() {
        for &(_, dst) in &transitions[s as usize] {
            if reachable.insert(dst) {
                queue.push_back(dst);
            }
        }
    }

    let remap: HashMap<State, State> =
        reachable.iter().enumerate().map(|(new_id, &old_id)| (old_id, new_id as State)).collect();

    let mut new_transitions = vec![Vec::new(); reachable.len()];
    for &old_id in &reachable {
        let new_id = remap[&old_id];
        new_transitions[new_id as usize] =
            transitions[old_id as usize].iter().map(|&(pair, dst)| (pair, remap[&dst])).collect();
    }
    let new_finals = finals.iter().filter_map(|f| remap.get(f).copied()).collect();
    let new_initial = remap[&initial];

    (new_transitions, new_finals, new_initial)
}

/// Moore's partition-refinement algorithm: starts from a two-block
/// partition by finality and repeatedly splits blocks whose members'
/// outgoing-transition signatures (relative to the current partition)
/// disagree, until the partition is stable. States left in the same
/// block at the fixed point are bisimilar and are merged into one
/// output state.
fn refine(
    transitions: &[Vec<(PairId, State)>],
    finals: &BTreeSet<State>,
    initial: State,
) -> (Vec<Vec<(PairId, State)>>, BTreeSet<State>, State) {
    let n = transitions.len();
    if n == 0 {
        return (Vec::new(), BTreeSet::new(), initial);
    }

    let mut block_of: Vec<u32> = (0..n).map(|s| if finals.contains(&(s as State)) { 1 } else { 0 }).collect();

    loop {
        let mut signature_to_block: HashMap<(u32, Vec<(PairId, u32)>), u32> = HashMap::new();
        let mut new_block_of = vec![0u32; n];

        for s in 0..n {
            let mut outgoing: Vec<(PairId, u32)> =
                transitions[s].iter().map(|&(pair, dst)| (pair, block_of[dst as usize])).collect();
            outgoing.sort_unstable();
            outgoing.dedup();
            let signature = (block_of[s], outgoing);
            let next_id = signature_to_block.len() as u32;
            let block = *signature_to_block.entry(signature).or_insert(next_id);
            new_block_of[s] = block;
        }

        if new_block_of == block_of {
            break;
        }
        block_of = new_block_of;
    }

    let block_count = block_of.iter().copied().collect::<HashSet<_>>().len();
    let mut new_transitions: Vec<BTreeSet<(PairId, State)>> = vec![BTreeSet::new(); block_count];
    let mut new_finals = BTreeSet::new();

    for s in 0..n {
        let block = block_of[s] as State;
        if finals.contains(&(s as State)) {
            new_finals.insert(block);
        }
        for &(pair, dst) in &transitions[s] {
            new_transitions[block as usize].insert((pair, block_of[dst as usize] as State));
        }
    }

    let new_initial = block_of[initial as usize] as State;
    (new_transitions.into_iter().map(|set| set.into_iter().collect()).collect(), new_finals, new_initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transducer;
    use lrx_alphabet::Alphabet;

    #[test]
    fn minimise_is_idempotent() {
        let mut alphabet = Alphabet::new();
        let c = alphabet.intern_symbol("c");
        let pair = alphabet.pair(c, lrx_alphabet::EPSILON);

        let mut t = Transducer::new();
        let a = t.step(t.initial(), pair);
        let b = t.step(t.initial(), pair);
        t.set_final(a);
        t.set_final(b);

        t.minimise();
        let first_pass_states = t.size();
        let first_pass_transitions = t.transition_count();

        t.minimise();
        assert_eq!(t.size(), first_pass_states);
        assert_eq!(t.transition_count(), first_pass_transitions);
    }

    #[test]
    fn minimise_merges_equivalent_parallel_paths() {
        let mut alphabet = Alphabet::new();
        let c = alphabet.intern_symbol("c");
        let pair = alphabet.pair(c, lrx_alphabet::EPSILON);

        let mut t = Transducer::new();
        // Two parallel branches recognising the same single-symbol
        // language should collapse to one after minimisation.
        let a = t.step(t.initial(), pair);
        let b = t.step(t.initial(), pair);
        t.set_final(a);
        t.set_final(b);

        t.minimise();
        assert_eq!(t.size(), 2);
        assert_eq!(t.transition_count(), 1);
    }
}
