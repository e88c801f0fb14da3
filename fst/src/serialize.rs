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

//! Binary serialization of a single transducer (§6, item 5: the `"main"`
//! transducer and each recogniser share this format).

use crate::Transducer;
use byteorder::{LittleEndian, WriteBytesExt};
use lrx_alphabet::Alphabet;
use std::io::{self, Write};

/// Writes: `u32` state count, `u32` initial state, `u32` final count
/// followed by that many `u32` final state ids, then per state (in id
/// order) a `u32` transition count followed by that many `(u32 pair_id,
/// u32 dst)` records. `alphabet` is accepted for symmetry with
/// `Alphabet::serialize` and so a future format revision can inline
/// symbol names without changing the call site; it is unused today
/// because transitions reference pair ids, not symbol names.
pub fn serialize(t: &Transducer, _alphabet: &Alphabet, sink: &mut impl Write) -> io::Result<()> {
    sink.write_u32::<LittleEndian>(t.size() as u32)?;
    sink.write_u32::<LittleEndian>(t.initial())?;

    let finals: Vec<u32> = t.finals().collect();
    sink.write_u32::<LittleEndian>(finals.len() as u32)?;
    for f in finals {
        sink.write_u32::<LittleEndian>(f)?;
    }

    for state in 0..t.size() as u32 {
        let transitions = t.transitions_from(state);
        sink.write_u32::<LittleEndian>(transitions.len() as u32)?;
        for &(pair, dst) in transitions {
            sink.write_u32::<LittleEndian>(pair.0)?;
            sink.write_u32::<LittleEndian>(dst)?;
        }
    }
    Ok(())
}
