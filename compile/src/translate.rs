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

//! C3 — the rule translator (§4.3): walks the rule tree and emits the
//! transducer mutations that encode its semantics.

use lrx_alphabet::{reserved, Alphabet, EPSILON, EPSILON_PAIR};
use lrx_ast::{Action, ActionSpec, ContextElement, DefSeq, Match, Or, Program, Repeat, Rule, Seq};
use lrx_errors::{Handler, LrxError, Result};
use lrx_fst::{State, Transducer};

use crate::registry::Registry;

/// Which tape a symbol step writes to. Context matching (`match`)
/// always consumes the upper tape; action payloads (`select`/
/// `remove`) are written to the lower tape in the main transducer, but
/// to the upper tape in a standalone recogniser, which reads an
/// analysis's upper tape to decide whether the action applies to it.
#[derive(Copy, Clone)]
enum Tape {
    Upper,
    Lower,
}

fn pair_for(tape: Tape, alphabet: &mut Alphabet, sym: lrx_alphabet::SymbolId) -> lrx_alphabet::PairId {
    match tape {
        Tape::Upper => alphabet.pair(sym, EPSILON),
        Tape::Lower => alphabet.pair(EPSILON, sym),
    }
}

fn step_symbol(t: &mut Transducer, alphabet: &mut Alphabet, state: State, name: &str, tape: Tape) -> State {
    let sym = alphabet.intern_symbol(name);
    let pair = pair_for(tape, alphabet, sym);
    t.step(state, pair)
}

fn self_loop_symbol(t: &mut Transducer, alphabet: &mut Alphabet, state: State, name: &str, tape: Tape) -> State {
    let sym = alphabet.intern_symbol(name);
    let pair = pair_for(tape, alphabet, sym);
    t.self_loop(state, pair)
}

fn emit_chars(t: &mut Transducer, alphabet: &mut Alphabet, mut state: State, text: &str, tape: Tape) -> State {
    for c in text.chars() {
        let mut buf = [0u8; 4];
        state = step_symbol(t, alphabet, state, c.encode_utf8(&mut buf), tape);
    }
    state
}

/// `lemma="*"` (the default) is a self-loop over any character;
/// anything else is stepped character by character (§4.3.1). Used for
/// `match` context emission and for a recogniser's own lemma encoding
/// (§4.3.4), both of which need to *accept* any lemma, not just record
/// one.
fn emit_lemma(t: &mut Transducer, alphabet: &mut Alphabet, state: State, lemma: Option<&str>, tape: Tape) -> State {
    let lemma = lemma.unwrap_or("*");
    if lemma == "*" {
        self_loop_symbol(t, alphabet, state, reserved::ANY_CHAR, tape)
    } else {
        emit_chars(t, alphabet, state, lemma, tape)
    }
}

/// Tokenises `tags` by `.`; each non-empty token becomes a step of
/// `<token>`, except `*` which is an `<ANY_TAG>` self-loop. An absent
/// or empty `tags` attribute defaults to a single `<ANY_TAG>`
/// self-loop (§4.3.1). Used for `match` context emission and for a
/// recogniser's own tag encoding (§4.3.4); see [`emit_lemma`].
fn emit_tags(t: &mut Transducer, alphabet: &mut Alphabet, mut state: State, tags: Option<&str>, tape: Tape) -> State {
    let tags = tags.unwrap_or("*");
    let mut tokens: Vec<&str> = tags.split('.').filter(|tok| !tok.is_empty()).collect();
    if tokens.is_empty() {
        tokens.push("*");
    }
    for token in tokens {
        state = if token == "*" {
            self_loop_symbol(t, alphabet, state, reserved::ANY_TAG, tape)
        } else {
            let marker = reserved::tag_marker(token);
            step_symbol(t, alphabet, state, &marker, tape)
        };
    }
    state
}

/// The action-payload counterpart of [`emit_lemma`]: the main
/// transducer only needs to *record* the lemma pattern on the lower
/// tape once, so `lemma="*"` is a single `ε:<ANY_CHAR>` step rather
/// than a self-loop (§4.3.4 item 1: "encoded as `ε:sym` steps").
fn emit_lemma_payload(t: &mut Transducer, alphabet: &mut Alphabet, state: State, lemma: Option<&str>, tape: Tape) -> State {
    let lemma = lemma.unwrap_or("*");
    if lemma == "*" {
        step_symbol(t, alphabet, state, reserved::ANY_CHAR, tape)
    } else {
        emit_chars(t, alphabet, state, lemma, tape)
    }
}

/// The action-payload counterpart of [`emit_tags`]; see
/// [`emit_lemma_payload`].
fn emit_tags_payload(
    t: &mut Transducer,
    alphabet: &mut Alphabet,
    mut state: State,
    tags: Option<&str>,
    tape: Tape,
) -> State {
    let tags = tags.unwrap_or("*");
    let mut tokens: Vec<&str> = tags.split('.').filter(|tok| !tok.is_empty()).collect();
    if tokens.is_empty() {
        tokens.push("*");
    }
    for token in tokens {
        state = if token == "*" {
            step_symbol(t, alphabet, state, reserved::ANY_TAG, tape)
        } else {
            let marker = reserved::tag_marker(token);
            step_symbol(t, alphabet, state, &marker, tape)
        };
    }
    state
}

/// Builds the recogniser key (§4.3.4, S2): the action marker, then
/// the lemma portion (`<ANY_CHAR>` for `*`, else its characters), then
/// each tag token (`<ANY_TAG>` for `*`).
fn recogniser_key(marker: &str, lemma: Option<&str>, tags: Option<&str>) -> String {
    let mut key = String::from(marker);
    match lemma.unwrap_or("*") {
        "*" => key.push_str(reserved::ANY_CHAR),
        other => key.push_str(other),
    }
    let tags = tags.unwrap_or("*");
    let mut tokens: Vec<&str> = tags.split('.').filter(|tok| !tok.is_empty()).collect();
    if tokens.is_empty() {
        tokens.push("*");
    }
    for token in tokens {
        if token == "*" {
            key.push_str(reserved::ANY_TAG);
        } else {
            key.push_str(&reserved::tag_marker(token));
        }
    }
    key
}

pub struct Translator<'a> {
    alphabet: &'a mut Alphabet,
    registry: &'a mut Registry,
    handler: &'a Handler,
    main: Transducer,
    cur: State,
    initial: State,
    can_select: bool,
    forbidden_context: &'static str,
    rule_id_counter: u32,
}

impl<'a> Translator<'a> {
    pub fn new(alphabet: &'a mut Alphabet, registry: &'a mut Registry, handler: &'a Handler) -> Self {
        let main = Transducer::new();
        let initial = main.initial();
        Translator {
            alphabet,
            registry,
            handler,
            main,
            cur: initial,
            initial,
            can_select: true,
            forbidden_context: "",
            rule_id_counter: 1,
        }
    }

    pub fn compile_program(mut self, program: &Program) -> Result<Transducer> {
        for def_seq in &program.def_seqs {
            self.compile_def_seq(def_seq)?;
        }
        for rule in &program.rules {
            self.compile_rule(rule)?;
        }
        self.main.minimise();
        Ok(self.main)
    }

    /// Swaps in a fresh transducer, runs `build` against it (tracking
    /// `cur` from its initial state), marks the final `cur` state
    /// final, then swaps the original transducer back and returns the
    /// one just built (§9: "swap out the main transducer, build into a
    /// scratch one, swap back", modelled as an explicit stack frame
    /// rather than a global toggle).
    fn with_scratch_transducer(
        &mut self,
        build: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<Transducer> {
        let saved_main = std::mem::replace(&mut self.main, Transducer::new());
        let saved_cur = self.cur;
        self.cur = self.main.initial();

        build(self)?;
        self.main.set_final(self.cur);

        let scratch = std::mem::replace(&mut self.main, saved_main);
        self.cur = saved_cur;
        Ok(scratch)
    }

    fn compile_rule(&mut self, rule: &Rule) -> Result<()> {
        // Every rule starts from a fresh epsilon transition off
        // `initial`, so distinct rules never share a prefix state.
        self.cur = self.main.step(self.initial, EPSILON_PAIR);
        self.compile_context_elements(&rule.body)?;
        self.finish_rule(rule.weight);
        Ok(())
    }

    fn finish_rule(&mut self, weight: Option<f64>) {
        self.emit_word_boundary();
        let rule_id = self.rule_id_counter;
        self.rule_id_counter += 1;
        let marker = reserved::rule_marker(rule_id);
        self.cur = step_symbol(&mut self.main, self.alphabet, self.cur, &marker, Tape::Lower);
        self.main.set_final(self.cur);
        self.registry.record_weight(rule_id, weight.unwrap_or(1.0));
        self.cur = self.initial;
    }

    fn compile_def_seq(&mut self, def_seq: &DefSeq) -> Result<()> {
        let prior_can_select = self.can_select;
        let prior_context = self.forbidden_context;
        self.can_select = false;
        self.forbidden_context = "def-seq";

        let built = self.with_scratch_transducer(|slf| slf.compile_context_elements(&def_seq.body))?;

        self.can_select = prior_can_select;
        self.forbidden_context = prior_context;
        self.registry.define_sequence(def_seq.name.clone(), built);
        Ok(())
    }

    fn compile_context_elements(&mut self, elems: &[ContextElement]) -> Result<()> {
        for elem in elems {
            match elem {
                ContextElement::Match(m) => self.compile_match(m)?,
                ContextElement::Or(o) => self.compile_or(o)?,
                ContextElement::Repeat(r) => self.compile_repeat(r)?,
                ContextElement::Seq(s) => self.compile_seq(s)?,
            }
        }
        Ok(())
    }

    fn compile_match(&mut self, m: &Match) -> Result<()> {
        match m.surface.as_deref().filter(|s| !s.is_empty()) {
            Some(surface) => {
                self.cur = emit_chars(&mut self.main, self.alphabet, self.cur, surface, Tape::Upper);
            }
            None => {
                if let Some(case) = m.case.as_deref() {
                    self.emit_case(case);
                }
                match m.suffix.as_deref().filter(|s| !s.is_empty()) {
                    Some(suffix) => {
                        self.emit_self_loop(reserved::ANY_CHAR, Tape::Upper);
                        self.cur = emit_chars(&mut self.main, self.alphabet, self.cur, suffix, Tape::Upper);
                    }
                    None => match m.contains.as_deref().filter(|s| !s.is_empty()) {
                        Some(contains) => {
                            self.emit_self_loop(reserved::ANY_CHAR, Tape::Upper);
                            self.cur = emit_chars(&mut self.main, self.alphabet, self.cur, contains, Tape::Upper);
                            self.emit_self_loop(reserved::ANY_CHAR, Tape::Upper);
                        }
                        None => {
                            let lemma = m.lemma.as_deref().unwrap_or("*");
                            if lemma == "*" {
                                // `case` already supplied the character
                                // class for this position; the default
                                // lemma contributes nothing further
                                // (`lrx_compiler.cc`'s matching `else`
                                // branch is a no-op here too).
                                if m.case.is_none() {
                                    self.emit_self_loop(reserved::ANY_CHAR, Tape::Upper);
                                }
                            } else {
                                self.cur = emit_chars(&mut self.main, self.alphabet, self.cur, lemma, Tape::Upper);
                            }
                        }
                    },
                }
            }
        }

        self.cur = emit_tags(&mut self.main, self.alphabet, self.cur, m.tags.as_deref(), Tape::Upper);

        if m.self_closing {
            self.emit_word_boundary();
            self.cur = step_symbol(&mut self.main, self.alphabet, self.cur, reserved::SKIP, Tape::Lower);
        }

        for action in &m.actions {
            self.compile_action(action)?;
        }
        Ok(())
    }

    fn emit_case(&mut self, case: &str) {
        match case {
            "AA" => self.emit_self_loop(reserved::ANY_UPPER, Tape::Upper),
            "aa" => self.emit_self_loop(reserved::ANY_LOWER, Tape::Upper),
            "Aa" => {
                self.cur = step_symbol(&mut self.main, self.alphabet, self.cur, reserved::ANY_UPPER, Tape::Upper);
                self.emit_self_loop(reserved::ANY_LOWER, Tape::Upper);
            }
            _ => {}
        }
    }

    fn emit_self_loop(&mut self, name: &str, tape: Tape) {
        self.cur = self_loop_symbol(&mut self.main, self.alphabet, self.cur, name, tape);
    }

    fn emit_word_boundary(&mut self) {
        let sym = self.alphabet.intern_symbol(reserved::WORD_BOUNDARY);
        let pair = self.alphabet.pair(sym, sym);
        self.cur = self.main.step(self.cur, pair);
    }

    fn compile_action(&mut self, action: &Action) -> Result<()> {
        let (spec, marker): (&ActionSpec, &str) = match action {
            Action::Select(spec) => (spec, reserved::SELECT),
            Action::Remove(spec) => (spec, reserved::REMOVE),
        };

        if !self.can_select {
            return Err(LrxError::ForbiddenAction {
                span: spec.span,
                action: if marker == reserved::SELECT { "select" } else { "remove" },
                context: self.forbidden_context,
            });
        }

        self.emit_word_boundary();
        self.cur = step_symbol(&mut self.main, self.alphabet, self.cur, marker, Tape::Lower);
        self.cur = emit_lemma_payload(&mut self.main, self.alphabet, self.cur, spec.lemma.as_deref(), Tape::Lower);
        self.cur = emit_tags_payload(&mut self.main, self.alphabet, self.cur, spec.tags.as_deref(), Tape::Lower);

        let mut recogniser = Transducer::new();
        let rstate = recogniser.initial();
        let rstate = emit_lemma(&mut recogniser, self.alphabet, rstate, spec.lemma.as_deref(), Tape::Upper);
        let rstate = emit_tags(&mut recogniser, self.alphabet, rstate, spec.tags.as_deref(), Tape::Upper);
        recogniser.set_final(rstate);

        let key = recogniser_key(marker, spec.lemma.as_deref(), spec.tags.as_deref());
        self.registry.register_recogniser(key, recogniser, self.handler);
        Ok(())
    }

    fn compile_or(&mut self, or: &Or) -> Result<()> {
        let entry = self.cur;
        let mut exits = Vec::new();
        for branch in &or.branches {
            self.cur = self.main.new_state_after(entry, EPSILON_PAIR);
            match branch {
                ContextElement::Match(m) => self.compile_match(m)?,
                ContextElement::Seq(s) => self.compile_seq(s)?,
                // The reader only ever places `match`/`seq` children
                // under an `or` (§4.3.2); anything else would be an
                // internal inconsistency rather than user input.
                _ => unreachable!("or branches are match or seq"),
            }
            exits.push(self.cur);
        }

        if let Some((&canonical, rest)) = exits.split_first() {
            for &exit in rest {
                self.main.link(exit, canonical, EPSILON_PAIR);
            }
            self.cur = canonical;
        }
        Ok(())
    }

    fn compile_repeat(&mut self, repeat: &Repeat) -> Result<()> {
        if repeat.from < 0 || repeat.upto < 0 || repeat.from > repeat.upto {
            return Err(LrxError::BadRepeatBounds { span: repeat.span, from: repeat.from, upto: repeat.upto });
        }

        let prior_can_select = self.can_select;
        let prior_context = self.forbidden_context;
        self.can_select = false;
        self.forbidden_context = "repeat";

        let body = self.with_scratch_transducer(|slf| slf.compile_context_elements(&repeat.body))?;

        self.can_select = prior_can_select;
        self.forbidden_context = prior_context;

        for _ in 0..repeat.from {
            self.cur = self.main.splice(self.cur, &body);
        }

        let mut optional_body = body.clone();
        optional_body.make_optional();
        for _ in 0..(repeat.upto - repeat.from) {
            self.cur = self.main.splice(self.cur, &optional_body);
        }
        Ok(())
    }

    fn compile_seq(&mut self, seq: &Seq) -> Result<()> {
        let target = self
            .registry
            .sequence(&seq.name)
            .cloned()
            .ok_or_else(|| LrxError::UnknownSequence { span: seq.span, name: seq.name.clone() })?;
        self.cur = self.main.splice(self.cur, &target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrx_alphabet::reserved as r;
    use lrx_ast::read_program_str;

    fn compile(xml: &str) -> (Transducer, Registry, Handler) {
        let (main, registry, handler, _alphabet) = compile_with_alphabet(xml);
        (main, registry, handler)
    }

    fn compile_with_alphabet(xml: &str) -> (Transducer, Registry, Handler, Alphabet) {
        let program = read_program_str(xml).unwrap();
        let mut alphabet = Alphabet::new();
        let mut registry = Registry::new();
        let handler = Handler::new();
        let main = Translator::new(&mut alphabet, &mut registry, &handler).compile_program(&program).unwrap();
        (main, registry, handler, alphabet)
    }

    #[test]
    fn s1_empty_rules_has_a_single_state_and_no_finals() {
        let (main, registry, _) = compile("<rules/>");
        assert_eq!(main.size(), 1);
        assert_eq!(main.finals().count(), 0);
        assert!(registry.weights.is_empty());
        assert!(registry.recognisers.is_empty());
    }

    #[test]
    fn s2_select_rule_produces_the_documented_recogniser_key() {
        let xml = r#"<rules><rule><match lemma="cat" tags="n">
            <select lemma="cat" tags="n.sg"/>
        </match></rule></rules>"#;
        let (_, registry, _) = compile(xml);
        assert_eq!(registry.recognisers.len(), 1);
        assert!(registry.recognisers.contains_key("<select>cat<n><sg>"));
        assert_eq!(registry.weights, vec![(1, 1.0)]);
    }

    #[test]
    fn s3_self_closing_match_defaults_emit_skip_and_no_recogniser() {
        let xml = r#"<rules><rule c="x" weight="2.5"><match/></rule></rules>"#;
        let (_, registry, _) = compile(xml);
        assert!(registry.recognisers.is_empty());
        assert_eq!(registry.weights, vec![(1, 2.5)]);
    }

    #[test]
    fn s5_seq_splices_a_previously_defined_sequence() {
        let xml = r#"<def-seqs><def-seq n="NP"><match tags="det"/><match tags="n"/></def-seq></def-seqs>
            <rules><rule><seq n="NP"/><select tags="*"/></rule></rules>"#;
        let (main, registry, _) = compile(xml);
        assert!(registry.sequences.contains_key("NP"));
        assert!(main.size() > 1);
    }

    #[test]
    fn l2_case_aa_with_default_lemma_does_not_step_a_literal_asterisk() {
        // §8 L2: `case="Aa"` with the default lemma must accept exactly
        // `<ANY_UPPER>` followed by zero-or-more `<ANY_LOWER>` — it must
        // not also step a literal `*` character onto the upper tape.
        let xml = r#"<rules><rule><match case="Aa"/></rule></rules>"#;
        let (_, _, _, alphabet) = compile_with_alphabet(xml);
        assert!(!alphabet.is_defined("*"));
    }

    #[test]
    fn action_payload_is_single_steps_not_self_loops() {
        // §4.3.4 item 1: the main transducer's action payload is
        // `ε:sym` steps, not a self-loop — the self-loop belongs only
        // to the separately-built recogniser.
        let xml = r#"<rules><rule><match><select/></match></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let ContextElement::Match(m) = &program.rules[0].body[0] else { panic!("expected match") };

        let mut alphabet = Alphabet::new();
        let mut registry = Registry::new();
        let handler = Handler::new();
        let mut translator = Translator::new(&mut alphabet, &mut registry, &handler);
        translator.compile_action(&m.actions[0]).unwrap();

        // word boundary, <select> marker, lemma payload, tags payload:
        // exactly four steps on a single linear chain, no epsilon
        // (self-loop back/bypass) transitions at all.
        assert_eq!(translator.main.transition_count(), 4);
        for state in 0..translator.main.size() as u32 {
            for &(pair, _) in translator.main.transitions_from(state) {
                assert_ne!(pair, EPSILON_PAIR, "action payload must not contain epsilon self-loop edges");
            }
        }
    }

    #[test]
    fn s6_inverted_repeat_bounds_are_a_fatal_error() {
        let xml = r#"<rules><rule><repeat from="2" upto="1"><match lemma="c"/></repeat></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let mut alphabet = Alphabet::new();
        let mut registry = Registry::new();
        let handler = Handler::new();
        let err = Translator::new(&mut alphabet, &mut registry, &handler).compile_program(&program).unwrap_err();
        assert!(matches!(err, LrxError::BadRepeatBounds { from: 2, upto: 1, .. }));
    }

    #[test]
    fn select_inside_repeat_is_forbidden() {
        let xml = r#"<rules><rule><repeat from="1" upto="1">
            <match lemma="c"><select tags="*"/></match>
        </repeat></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let mut alphabet = Alphabet::new();
        let mut registry = Registry::new();
        let handler = Handler::new();
        let err = Translator::new(&mut alphabet, &mut registry, &handler).compile_program(&program).unwrap_err();
        assert!(matches!(err, LrxError::ForbiddenAction { context: "repeat", .. }));
    }

    #[test]
    fn unknown_sequence_reference_is_fatal() {
        let xml = r#"<rules><rule><seq n="NOPE"/></rule></rules>"#;
        let program = read_program_str(xml).unwrap();
        let mut alphabet = Alphabet::new();
        let mut registry = Registry::new();
        let handler = Handler::new();
        let err = Translator::new(&mut alphabet, &mut registry, &handler).compile_program(&program).unwrap_err();
        assert!(matches!(err, LrxError::UnknownSequence { .. }));
    }

    #[test]
    fn p1_every_rule_gets_a_distinct_rule_marker() {
        let xml = r#"<rules><rule><match lemma="a"/></rule><rule><match lemma="b"/></rule></rules>"#;
        let (_, registry, _) = compile(xml);
        assert_eq!(registry.weights.iter().map(|&(id, _)| id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn p5_reserved_symbols_survive_an_empty_compile() {
        let (_main, _registry, _handler, alphabet) = compile_with_alphabet("<rules/>");
        for name in r::ALL {
            assert!(alphabet.is_defined(name));
        }
    }

    #[test]
    fn weight_is_not_a_fatal_error_when_unparseable() {
        let xml = r#"<rules><rule weight="garbage"><match/></rule></rules>"#;
        let (_, registry, _) = compile(xml);
        assert_eq!(registry.weights, vec![(1, 1.0)]);
    }
}
