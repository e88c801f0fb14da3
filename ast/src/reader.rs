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

//! The rule file's XML reader.
//!
//! XML tokenisation itself is an external collaborator (§1); this
//! module is the thin layer translating `quick_xml`'s event stream
//! into the [`crate::tree`] node kinds, attaching a [`Span`] to every
//! node from the parser's current line.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lrx_errors::{LrxError, Result};
use lrx_span::Span;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::tree::{Action, ActionSpec, ContextElement, DefSeq, Match, Or, Program, Repeat, Rule, Seq};

/// Reads and parses the rule file at `path`.
pub fn read_program(path: &Path) -> Result<Program> {
    let data =
        fs::read_to_string(path).map_err(|source| LrxError::InputOpen { path: path.to_path_buf(), source })?;
    read_program_str(&data)
}

/// Parses an already-loaded rule document.
pub fn read_program_str(xml: &str) -> Result<Program> {
    let mut cursor = Cursor::new(xml);
    parse_program(&mut cursor)
}

type Attrs = HashMap<String, String>;

enum Tok {
    Start { name: String, attrs: Attrs, empty: bool, span: Span },
    End { name: String, span: Span },
    Text { content: String, span: Span },
    Eof,
}

/// Wraps `quick_xml::Reader` and converts each event into an owned
/// [`Tok`] carrying its line number, so the recursive-descent parser
/// below never has to juggle the reader's borrowed-buffer lifetimes.
struct Cursor<'a> {
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
    newline_offsets: Vec<usize>,
}

impl<'a> Cursor<'a> {
    fn new(xml: &'a str) -> Self {
        let newline_offsets = xml.bytes().enumerate().filter(|&(_, b)| b == b'\n').map(|(i, _)| i).collect();
        Cursor { reader: Reader::from_str(xml), buf: Vec::new(), newline_offsets }
    }

    fn line_at(&self, byte_offset: usize) -> u32 {
        (self.newline_offsets.partition_point(|&o| o < byte_offset) + 1) as u32
    }

    fn span_here(&self) -> Span {
        Span::new(self.line_at(self.reader.buffer_position() as usize))
    }

    fn next(&mut self) -> Result<Tok> {
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| LrxError::XmlParse { span: self.span_here(), message: e.to_string() })?;
            let span = self.span_here();
            match event {
                Event::Eof => return Ok(Tok::Eof),
                Event::Start(e) => {
                    let name = element_name(&e);
                    let attrs = element_attrs(&e, span)?;
                    return Ok(Tok::Start { name, attrs, empty: false, span });
                }
                Event::Empty(e) => {
                    let name = element_name(&e);
                    let attrs = element_attrs(&e, span)?;
                    return Ok(Tok::Start { name, attrs, empty: true, span });
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Ok(Tok::End { name, span });
                }
                Event::Text(e) => {
                    let content = e
                        .unescape()
                        .map_err(|err| LrxError::XmlParse { span, message: err.to_string() })?
                        .into_owned();
                    return Ok(Tok::Text { content, span });
                }
                Event::CData(e) => {
                    let content = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    return Ok(Tok::Text { content, span });
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => continue,
            }
        }
    }
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn element_attrs(e: &BytesStart, span: Span) -> Result<Attrs> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| LrxError::XmlParse { span, message: err.to_string() })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| LrxError::XmlParse { span, message: err.to_string() })?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

/// Non-blank text outside of an element is `MalformedBody` (§7);
/// blank runs (pure whitespace, including none at all) are tolerated
/// silently.
fn require_blank(content: &str, span: Span) -> Result<()> {
    if content.trim().is_empty() {
        Ok(())
    } else {
        Err(LrxError::MalformedBody { span, text: content.to_string() })
    }
}

fn unexpected_eof(span: Span) -> LrxError {
    LrxError::XmlParse { span, message: "unexpected end of input".to_string() }
}

fn parse_program(cur: &mut Cursor) -> Result<Program> {
    let mut def_seqs = Vec::new();
    let mut rules = Vec::new();
    loop {
        match cur.next()? {
            Tok::Eof => break,
            Tok::Text { content, span } => require_blank(&content, span)?,
            Tok::Start { name, attrs, empty, span } => match name.as_str() {
                "lrx" | "rules" | "def-seqs" => {
                    if empty {
                        continue;
                    }
                }
                "def-seq" => def_seqs.push(parse_def_seq(cur, &attrs, span)?),
                "rule" => rules.push(parse_rule(cur, &attrs, span)?),
                other => return Err(LrxError::UnexpectedElement { span, element: other.to_string() }),
            },
            Tok::End { name, span } => match name.as_str() {
                "lrx" | "rules" | "def-seqs" => {}
                other => return Err(LrxError::UnexpectedElement { span, element: other.to_string() }),
            },
        }
    }
    Ok(Program { def_seqs, rules })
}

fn parse_def_seq(cur: &mut Cursor, attrs: &Attrs, span: Span) -> Result<DefSeq> {
    let name = attrs.get("n").cloned().unwrap_or_default();
    let body = parse_context_elements(cur, "def-seq")?;
    Ok(DefSeq { name, body, span })
}

fn parse_rule(cur: &mut Cursor, attrs: &Attrs, span: Span) -> Result<Rule> {
    let comment = attrs.get("c").cloned();
    let weight = attrs.get("weight").and_then(|w| w.trim().parse::<f64>().ok());
    let body = parse_context_elements(cur, "rule")?;
    Ok(Rule { comment, weight, body, span })
}

/// Shared grammar for a rule body, a `def-seq` body, and a `repeat`
/// body: a sequence of `match` | `or` | `repeat` | `seq` children,
/// terminated by the named closing tag. Whether `select`/`remove` are
/// actually permitted at this nesting is a translator-time concern
/// (`can_select`, §4.3), not a grammar restriction the reader enforces.
fn parse_context_elements(cur: &mut Cursor, closing_name: &str) -> Result<Vec<ContextElement>> {
    let mut elems = Vec::new();
    loop {
        match cur.next()? {
            Tok::Eof => return Err(unexpected_eof(Span::dummy())),
            Tok::Text { content, span } => require_blank(&content, span)?,
            Tok::Start { name, attrs, empty, span } => match name.as_str() {
                "match" => elems.push(ContextElement::Match(parse_match(cur, &attrs, empty, span)?)),
                "or" => elems.push(ContextElement::Or(parse_or(cur, span)?)),
                "repeat" => elems.push(ContextElement::Repeat(parse_repeat(cur, &attrs, span)?)),
                "seq" => elems.push(ContextElement::Seq(parse_seq(&attrs, span))),
                other => return Err(LrxError::UnexpectedElement { span, element: other.to_string() }),
            },
            Tok::End { name, span } => {
                if name == closing_name {
                    break;
                }
                return Err(LrxError::UnexpectedElement { span, element: name });
            }
        }
    }
    Ok(elems)
}

fn parse_match(cur: &mut Cursor, attrs: &Attrs, self_closing: bool, span: Span) -> Result<Match> {
    let mut actions = Vec::new();
    if !self_closing {
        loop {
            match cur.next()? {
                Tok::Eof => return Err(unexpected_eof(span)),
                Tok::Text { content, span } => require_blank(&content, span)?,
                Tok::Start { name, attrs, empty, span } if name == "select" => {
                    actions.push(Action::Select(parse_action_spec(cur, &attrs, empty, "select", span)?));
                }
                Tok::Start { name, attrs, empty, span } if name == "remove" => {
                    actions.push(Action::Remove(parse_action_spec(cur, &attrs, empty, "remove", span)?));
                }
                Tok::Start { name, span, .. } => return Err(LrxError::UnexpectedElement { span, element: name }),
                Tok::End { name, span } => {
                    if name == "match" {
                        break;
                    }
                    return Err(LrxError::UnexpectedElement { span, element: name });
                }
            }
        }
    }

    Ok(Match {
        surface: attrs.get("surface").cloned(),
        lemma: attrs.get("lemma").cloned(),
        suffix: attrs.get("suffix").cloned(),
        contains: attrs.get("contains").cloned(),
        case: attrs.get("case").cloned(),
        tags: attrs.get("tags").cloned(),
        actions,
        self_closing,
        span,
    })
}

fn parse_action_spec(cur: &mut Cursor, attrs: &Attrs, empty: bool, tag: &str, span: Span) -> Result<ActionSpec> {
    if !empty {
        loop {
            match cur.next()? {
                Tok::Eof => return Err(unexpected_eof(span)),
                Tok::Text { content, span } => require_blank(&content, span)?,
                Tok::Start { name, span, .. } => return Err(LrxError::UnexpectedElement { span, element: name }),
                Tok::End { name, span } => {
                    if name == tag {
                        break;
                    }
                    return Err(LrxError::UnexpectedElement { span, element: name });
                }
            }
        }
    }
    Ok(ActionSpec { lemma: attrs.get("lemma").cloned(), tags: attrs.get("tags").cloned(), span })
}

fn parse_or(cur: &mut Cursor, span: Span) -> Result<Or> {
    let mut branches = Vec::new();
    loop {
        match cur.next()? {
            Tok::Eof => return Err(unexpected_eof(span)),
            Tok::Text { content, span } => require_blank(&content, span)?,
            Tok::Start { name, attrs, empty, span } if name == "match" => {
                branches.push(ContextElement::Match(parse_match(cur, &attrs, empty, span)?));
            }
            Tok::Start { name, attrs, span, .. } if name == "seq" => {
                branches.push(ContextElement::Seq(parse_seq(&attrs, span)));
            }
            Tok::Start { name, span, .. } => return Err(LrxError::UnexpectedElement { span, element: name }),
            Tok::End { name, span } => {
                if name == "or" {
                    break;
                }
                return Err(LrxError::UnexpectedElement { span, element: name });
            }
        }
    }
    Ok(Or { branches, span })
}

fn parse_repeat(cur: &mut Cursor, attrs: &Attrs, span: Span) -> Result<Repeat> {
    let from = parse_repeat_bound(attrs.get("from"));
    let upto = parse_repeat_bound(attrs.get("upto"));
    let body = parse_context_elements(cur, "repeat")?;
    Ok(Repeat { from, upto, body, span })
}

/// An unparseable bound collapses to a sentinel well below zero, so
/// the translator's existing `from < 0` check (§4.3.3) rejects
/// "missing or garbage bound" the same way it rejects "negative
/// bound", without a second error kind.
fn parse_repeat_bound(raw: Option<&String>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(i64::MIN / 2)
}

fn parse_seq(attrs: &Attrs, span: Span) -> Seq {
    Seq { name: attrs.get("n").cloned().unwrap_or_default(), span }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rules_parses_to_an_empty_program() {
        let program = read_program_str("<lrx><rules/></lrx>").unwrap();
        assert!(program.def_seqs.is_empty());
        assert!(program.rules.is_empty());
    }

    #[test]
    fn self_closing_match_is_distinguished_from_empty_body() {
        let program = read_program_str(r#"<rules><rule><match/></rule></rules>"#).unwrap();
        let ContextElement::Match(m) = &program.rules[0].body[0] else { panic!("expected match") };
        assert!(m.self_closing);
        assert!(m.actions.is_empty());
    }

    #[test]
    fn select_and_remove_children_are_collected() {
        let xml = r#"<rules><rule><match lemma="cat" tags="n">
            <select lemma="cat" tags="n.sg"/>
        </match></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let ContextElement::Match(m) = &program.rules[0].body[0] else { panic!("expected match") };
        assert!(!m.self_closing);
        assert_eq!(m.actions.len(), 1);
        assert!(matches!(&m.actions[0], Action::Select(spec) if spec.lemma.as_deref() == Some("cat")));
    }

    #[test]
    fn or_branches_collect_match_and_seq_children() {
        let xml = r#"<rules><rule><or><match lemma="a"/><seq n="X"/></or></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let ContextElement::Or(or) = &program.rules[0].body[0] else { panic!("expected or") };
        assert_eq!(or.branches.len(), 2);
    }

    #[test]
    fn repeat_bounds_parse_as_integers() {
        let xml = r#"<rules><rule><repeat from="1" upto="2"><match lemma="c"/></repeat></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let ContextElement::Repeat(r) = &program.rules[0].body[0] else { panic!("expected repeat") };
        assert_eq!((r.from, r.upto), (1, 2));
    }

    #[test]
    fn garbage_repeat_bound_collapses_to_a_negative_sentinel() {
        let xml = r#"<rules><rule><repeat from="oops" upto="2"><match lemma="c"/></repeat></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let ContextElement::Repeat(r) = &program.rules[0].body[0] else { panic!("expected repeat") };
        assert!(r.from < 0);
    }

    #[test]
    fn non_blank_text_outside_elements_is_malformed_body() {
        let err = read_program_str("<rules>stray text<rule><match/></rule></rules>").unwrap_err();
        assert!(matches!(err, LrxError::MalformedBody { .. }));
    }

    #[test]
    fn unknown_element_is_rejected() {
        let err = read_program_str("<rules><bogus/></rules>").unwrap_err();
        assert!(matches!(err, LrxError::UnexpectedElement { .. }));
    }

    #[test]
    fn weight_parse_failure_is_not_an_error() {
        let program = read_program_str(r#"<rules><rule weight="not-a-number"><match/></rule></rules>"#).unwrap();
        assert_eq!(program.rules[0].weight, None);
    }

    #[test]
    fn def_seq_name_and_body_are_captured() {
        let xml = r#"<def-seqs><def-seq n="NP"><match tags="det"/><match tags="n"/></def-seq></def-seqs>"#;
        let program = read_program_str(xml).unwrap();
        assert_eq!(program.def_seqs[0].name, "NP");
        assert_eq!(program.def_seqs[0].body.len(), 2);
    }
}
