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

//! C5 — the artifact writer (§6): serializes the alphabet, then every
//! recogniser, then the main transducer, then the per-rule weight
//! records, in that exact order.

use byteorder::{LittleEndian, WriteBytesExt};
use lrx_alphabet::Alphabet;
use lrx_fst::Transducer;
use std::io::{self, Write};

use crate::registry::Registry;

const MAIN_LABEL: &str = "main";

pub fn write_bundle(
    sink: &mut impl Write,
    alphabet: &Alphabet,
    registry: &Registry,
    main: &Transducer,
) -> io::Result<()> {
    alphabet.serialize(sink)?;

    write_multibyte(sink, registry.recognisers.len() as u64)?;
    for (key, recogniser) in &registry.recognisers {
        write_wide_string(sink, key)?;
        lrx_fst::serialize(recogniser, alphabet, sink)?;
    }

    write_wide_string(sink, MAIN_LABEL)?;
    lrx_fst::serialize(main, alphabet, sink)?;

    for &(rule_id, weight) in &registry.weights {
        sink.write_u32::<LittleEndian>(rule_id)?;
        write_wide_string(sink, "")?;
        sink.write_f64::<LittleEndian>(weight)?;
    }
    Ok(())
}

/// Writes `value` in the bundle's multibyte integer encoding (§6 item
/// 2): a base-128 varint, least-significant group first, with the
/// high bit of every byte but the last set — mirroring the original
/// compiler's `Compression::multibyte_write` before the runtime
/// applier decodes it back into a plain integer.
fn write_multibyte(sink: &mut impl Write, mut value: u64) -> io::Result<()> {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        sink.write_u8(byte)?;
        if value == 0 {
            break;
        }
    }
    Ok(())
}

/// Writes a length-prefixed UTF-8 string, the length itself encoded
/// with [`write_multibyte`] per §6's "length-prefixed wide-string".
fn write_wide_string(sink: &mut impl Write, s: &str) -> io::Result<()> {
    let bytes = s.as_bytes();
    write_multibyte(sink, bytes.len() as u64)?;
    sink.write_all(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::Translator;
    use lrx_ast::read_program_str;
    use lrx_errors::Handler;

    #[test]
    fn multibyte_encodes_small_values_in_one_byte() {
        let mut buf = Vec::new();
        write_multibyte(&mut buf, 5).unwrap();
        assert_eq!(buf, vec![5]);
    }

    #[test]
    fn multibyte_encodes_large_values_across_multiple_bytes() {
        let mut buf = Vec::new();
        write_multibyte(&mut buf, 300).unwrap();
        assert_eq!(buf, vec![0xAC, 0x02]);
    }

    #[test]
    fn bundle_layout_matches_the_documented_order() {
        let xml = r#"<rules><rule><match lemma="cat" tags="n">
            <select lemma="cat" tags="n.sg"/>
        </match></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let mut alphabet = Alphabet::new();
        let mut registry = Registry::new();
        let handler = Handler::new();
        let main = Translator::new(&mut alphabet, &mut registry, &handler).compile_program(&program).unwrap();

        let mut buf = Vec::new();
        write_bundle(&mut buf, &alphabet, &registry, &main).unwrap();

        // One recogniser and one weight record were written; the
        // buffer must be non-trivially larger than just the alphabet
        // on its own.
        let mut alphabet_only = Vec::new();
        alphabet.serialize(&mut alphabet_only).unwrap();
        assert!(buf.len() > alphabet_only.len());
        assert_eq!(registry.recognisers.len(), 1);
        assert_eq!(registry.weights.len(), 1);
    }
}
