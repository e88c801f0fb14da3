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

//! C1 — the symbol alphabet.
//!
//! Interns ordinary characters, wildcard symbols (`<ANY_CHAR>` and
//! friends), grammatical tags, and action markers into dense integer
//! ids, and interns ordered pairs of those ids (upper, lower) into a
//! second dense id space for use as transducer transition labels.

#![forbid(unsafe_code)]

pub mod reserved;

use byteorder::{LittleEndian, WriteBytesExt};
use indexmap::IndexMap;
use std::io::{self, Write};

/// The id of an interned [`Alphabet`] symbol. Id 0 is always epsilon
/// (the empty string).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SymbolId(pub u32);

/// The id of an interned `(upper, lower)` symbol pair. Pair id 0 is
/// always `(EPSILON, EPSILON)`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PairId(pub u32);

pub const EPSILON: SymbolId = SymbolId(0);
pub const EPSILON_PAIR: PairId = PairId(0);

/// A symbol is "single-character" iff its name is exactly one Unicode
/// scalar value outside the `<name>` reserved form (§4.1).
pub fn is_single_char(name: &str) -> bool {
    name.chars().count() == 1
}

/// An append-only interner for symbols and symbol pairs (§4.1).
///
/// IDs are never reused and the reserved names (§3) plus the
/// epsilon symbol/pair pre-exist after [`Alphabet::new`].
pub struct Alphabet {
    names: Vec<String>,
    by_name: IndexMap<String, SymbolId>,
    pairs: Vec<(SymbolId, SymbolId)>,
    by_pair: IndexMap<(SymbolId, SymbolId), PairId>,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new()
    }
}

impl Alphabet {
    pub fn new() -> Self {
        let mut alphabet =
            Alphabet { names: Vec::new(), by_name: IndexMap::new(), pairs: Vec::new(), by_pair: IndexMap::new() };

        // id 0: the empty-string symbol (epsilon).
        alphabet.intern_symbol("");
        // pair 0: (epsilon, epsilon).
        alphabet.pair(EPSILON, EPSILON);

        for name in reserved::ALL {
            alphabet.intern_symbol(name);
        }

        alphabet
    }

    /// Interns `name`, returning the existing id if already defined.
    /// Idempotent.
    pub fn intern_symbol(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = SymbolId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Interns the ordered pair `(a, b)`, deterministic within one
    /// compilation: the same pair always maps to the same id.
    pub fn pair(&mut self, a: SymbolId, b: SymbolId) -> PairId {
        if let Some(&id) = self.by_pair.get(&(a, b)) {
            return id;
        }
        let id = PairId(self.pairs.len() as u32);
        self.pairs.push((a, b));
        self.by_pair.insert((a, b), id);
        id
    }

    pub fn pair_parts(&self, id: PairId) -> (SymbolId, SymbolId) {
        self.pairs[id.0 as usize]
    }

    /// Writes the alphabet in the runtime's binary format: a
    /// multibyte-style `u32` symbol count, followed by one record per
    /// symbol (after the reserved epsilon entry at id 0): a one-byte
    /// kind tag (`0` = single Unicode scalar, `1` = named token) and
    /// either the scalar's code point or a length-prefixed UTF-8 name.
    pub fn serialize(&self, sink: &mut impl Write) -> io::Result<()> {
        sink.write_u32::<LittleEndian>((self.names.len() - 1) as u32)?;
        for name in self.names.iter().skip(1) {
            if is_single_char(name) {
                sink.write_u8(0)?;
                let scalar = name.chars().next().expect("single-char symbol has one scalar");
                sink.write_u32::<LittleEndian>(scalar as u32)?;
            } else {
                sink.write_u8(1)?;
                let bytes = name.as_bytes();
                sink.write_u32::<LittleEndian>(bytes.len() as u32)?;
                sink.write_all(bytes)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_symbols_are_preinterned() {
        let alphabet = Alphabet::new();
        for name in reserved::ALL {
            assert!(alphabet.is_defined(name), "{name} should be pre-interned");
        }
        assert_eq!(alphabet.symbol_name(EPSILON), "");
    }

    #[test]
    fn interning_is_idempotent() {
        let mut alphabet = Alphabet::new();
        let a = alphabet.intern_symbol("cat");
        let b = alphabet.intern_symbol("cat");
        assert_eq!(a, b);
    }

    #[test]
    fn pair_ids_are_deterministic_within_a_compile() {
        let mut alphabet = Alphabet::new();
        let c = alphabet.intern_symbol("c");
        let eps = EPSILON;
        let p1 = alphabet.pair(c, eps);
        let p2 = alphabet.pair(c, eps);
        assert_eq!(p1, p2);
        assert_eq!(alphabet.pair(eps, eps), EPSILON_PAIR);
    }

    #[test]
    fn single_character_detection() {
        assert!(is_single_char("c"));
        assert!(!is_single_char("<ANY_CHAR>"));
        assert!(!is_single_char(""));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut alphabet = Alphabet::new();
        let before = alphabet.len();
        alphabet.intern_symbol("x");
        alphabet.intern_symbol("x");
        assert_eq!(alphabet.len(), before + 1);
    }
}
