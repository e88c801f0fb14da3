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

//! The rule tree (§3, §6) and the XML reader that produces it.
//!
//! XML tokenisation is an external collaborator (§1); this crate is
//! the thin translation layer from `quick_xml`'s event stream into the
//! node kinds `lrx-compile`'s translator (C3) walks.

#![forbid(unsafe_code)]

mod reader;
mod tree;

pub use reader::{read_program, read_program_str};
pub use tree::*;
