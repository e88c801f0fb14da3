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

//! The fixed set of symbol names every alphabet pre-interns (§3, P5).

/// Reserved symbol names, pre-interned by [`crate::Alphabet::new`] so that
/// every compile — even one that produces an empty rule set — has them
/// available at a stable id.
pub const SELECT: &str = "<select>";
pub const REMOVE: &str = "<remove>";
pub const SKIP: &str = "<skip>";
pub const ANY_TAG: &str = "<ANY_TAG>";
pub const ANY_CHAR: &str = "<ANY_CHAR>";
pub const ANY_UPPER: &str = "<ANY_UPPER>";
pub const ANY_LOWER: &str = "<ANY_LOWER>";
pub const WORD_BOUNDARY: &str = "<$>";

pub const ALL: &[&str] = &[SELECT, REMOVE, SKIP, ANY_TAG, ANY_CHAR, ANY_UPPER, ANY_LOWER, WORD_BOUNDARY];

/// Builds the rule-id marker symbol name for a given 1-based rule id,
/// e.g. `rule_marker(1) == "<rule1>"`.
pub fn rule_marker(rule_id: u32) -> String {
    format!("<rule{rule_id}>")
}

/// Builds a grammatical-tag symbol name, e.g. `tag_marker("n") == "<n>"`.
pub fn tag_marker(tag: &str) -> String {
    format!("<{tag}>")
}
