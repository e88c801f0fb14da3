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

//! C4 — the rule registry (§4.4): named sequences, recognisers, and
//! per-rule weights, all insertion-ordered for reproducible
//! serialization.

use indexmap::IndexMap;
use lrx_errors::Handler;
use lrx_fst::Transducer;

#[derive(Default)]
pub struct Registry {
    pub sequences: IndexMap<String, Transducer>,
    pub recognisers: IndexMap<String, Transducer>,
    pub weights: Vec<(u32, f64)>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn define_sequence(&mut self, name: String, built: Transducer) {
        self.sequences.insert(name, built);
    }

    pub fn sequence(&self, name: &str) -> Option<&Transducer> {
        self.sequences.get(name)
    }

    /// Inserts (or overwrites) a recogniser under `key` (§9: identical
    /// keys overwrite, last write wins). Warns through `handler` when
    /// an existing entry under the same key has a different shape —
    /// the same key built from two different subtrees is surprising
    /// even though overwriting it is not an error.
    pub fn register_recogniser(&mut self, key: String, built: Transducer, handler: &Handler) {
        if let Some(existing) = self.recognisers.get(&key) {
            if existing.fingerprint() != built.fingerprint() {
                handler.warn(format!(
                    "recogniser key '{key}' was already registered with a differently-shaped \
                     construction; the new one replaces it"
                ));
            }
        }
        self.recognisers.insert(key, built);
    }

    pub fn record_weight(&mut self, rule_id: u32, weight: f64) {
        self.weights.push((rule_id, weight));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrx_alphabet::{Alphabet, EPSILON};

    #[test]
    fn identical_shape_reregistration_warns_nothing() {
        let mut alphabet = Alphabet::new();
        let c = alphabet.intern_symbol("c");
        let pair = alphabet.pair(c, EPSILON);
        let mut build = || {
            let mut t = Transducer::new();
            let f = t.step(t.initial(), pair);
            t.set_final(f);
            t
        };

        let handler = Handler::new();
        let mut registry = Registry::new();
        registry.register_recogniser("<select>c<ANY_TAG>".to_string(), build(), &handler);
        registry.register_recogniser("<select>c<ANY_TAG>".to_string(), build(), &handler);
        assert!(handler.warnings().is_empty());
    }

    #[test]
    fn differently_shaped_reregistration_warns_once() {
        let mut alphabet = Alphabet::new();
        let c = alphabet.intern_symbol("c");
        let d = alphabet.intern_symbol("d");
        let pair_c = alphabet.pair(c, EPSILON);
        let pair_d = alphabet.pair(d, EPSILON);

        let mut first = Transducer::new();
        let f1 = first.step(first.initial(), pair_c);
        first.set_final(f1);

        let mut second = Transducer::new();
        let f2 = second.step(second.initial(), pair_d);
        second.set_final(f2);

        let handler = Handler::new();
        let mut registry = Registry::new();
        registry.register_recogniser("k".to_string(), first, &handler);
        registry.register_recogniser("k".to_string(), second, &handler);
        assert_eq!(handler.warnings().len(), 1);
    }
}
