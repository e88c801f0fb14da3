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

//! Human-readable transducer dumps for `--debug`/`--graph` diagnostics.

use crate::Transducer;
use lrx_alphabet::Alphabet;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Writes a line per state listing its transitions as `upper:lower ->
/// dst`, with `(final)` appended to final states.
pub fn render(t: &Transducer, alphabet: &Alphabet, sink: &mut impl Write) -> io::Result<()> {
    for state in 0..t.size() as u32 {
        let mut line = String::new();
        let marker = if t.is_final(state) { " (final)" } else { "" };
        if state == t.initial() {
            let _ = write!(line, "state {state} (initial){marker}:");
        } else {
            let _ = write!(line, "state {state}{marker}:");
        }
        writeln!(sink, "{line}")?;

        for &(pair, dst) in t.transitions_from(state) {
            let (upper, lower) = alphabet.pair_parts(pair);
            let upper_name = display_symbol(alphabet.symbol_name(upper));
            let lower_name = display_symbol(alphabet.symbol_name(lower));
            writeln!(sink, "  {upper_name}:{lower_name} -> {dst}")?;
        }
    }
    Ok(())
}

fn display_symbol(name: &str) -> &str {
    if name.is_empty() { "ε" } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrx_alphabet::EPSILON;

    #[test]
    fn render_marks_initial_and_final_states() {
        let mut alphabet = Alphabet::new();
        let c = alphabet.intern_symbol("c");
        let pair = alphabet.pair(c, EPSILON);

        let mut t = Transducer::new();
        let final_state = t.step(t.initial(), pair);
        t.set_final(final_state);

        let mut out: Vec<u8> = Vec::new();
        render(&t, &alphabet, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("(initial)"));
        assert!(out.contains("(final)"));
        assert!(out.contains("c:ε"));
    }
}
