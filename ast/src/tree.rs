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

//! The rule-tree data model (§3: `NamedSequence` inputs, §4.3's node
//! kinds). This is what the reader produces and the translator
//! consumes; it carries no compiled state of its own.

use lrx_span::Span;

/// The whole parsed rule file: zero or more named sequence definitions
/// followed by zero or more rules, in document order.
#[derive(Debug, Default)]
pub struct Program {
    pub def_seqs: Vec<DefSeq>,
    pub rules: Vec<Rule>,
}

/// A `<def-seq n="...">...</def-seq>` definition.
#[derive(Debug)]
pub struct DefSeq {
    pub name: String,
    pub body: Vec<ContextElement>,
    pub span: Span,
}

/// A `<rule>...</rule>` definition. `weight` is `None` both when the
/// attribute is absent and when it fails to parse — both cases fall
/// back to the same default (§7: weight parse failures are not
/// errors).
#[derive(Debug)]
pub struct Rule {
    pub comment: Option<String>,
    pub weight: Option<f64>,
    pub body: Vec<ContextElement>,
    pub span: Span,
}

/// One of the four node kinds a rule body or `def-seq` body may
/// contain (§4.3).
#[derive(Debug)]
pub enum ContextElement {
    Match(Match),
    Or(Or),
    Repeat(Repeat),
    Seq(Seq),
}

/// A `<match .../>` or `<match>...</match>` element. `self_closing`
/// distinguishes the two forms: a non-self-closing, childless `<match>
/// </match>` is legal but semantically different from `<match/>`
/// (§4.3.1 only appends the `<$>:<$>`/`ε:<skip>` tail on the
/// self-closing form).
#[derive(Debug)]
pub struct Match {
    pub surface: Option<String>,
    pub lemma: Option<String>,
    pub suffix: Option<String>,
    pub contains: Option<String>,
    pub case: Option<String>,
    pub tags: Option<String>,
    pub actions: Vec<Action>,
    pub self_closing: bool,
    pub span: Span,
}

/// A `select` or `remove` action child of a `match`.
#[derive(Debug)]
pub enum Action {
    Select(ActionSpec),
    Remove(ActionSpec),
}

#[derive(Debug)]
pub struct ActionSpec {
    pub lemma: Option<String>,
    pub tags: Option<String>,
    pub span: Span,
}

/// An `<or>` element: a set of mutually exclusive branches, each a
/// `match` or a `seq` (§4.3.2).
#[derive(Debug)]
pub struct Or {
    pub branches: Vec<ContextElement>,
    pub span: Span,
}

/// A `<repeat from="..." upto="...">...</repeat>` element. Bounds are
/// parsed eagerly; an unparseable bound becomes a very negative
/// sentinel so the translator's `from < 0` validation (§4.3.3) catches
/// both "negative" and "not a number" the same way.
#[derive(Debug)]
pub struct Repeat {
    pub from: i64,
    pub upto: i64,
    pub body: Vec<ContextElement>,
    pub span: Span,
}

/// A `<seq n="..."/>` reference to a previously defined `def-seq`.
#[derive(Debug)]
pub struct Seq {
    pub name: String,
    pub span: Span,
}
