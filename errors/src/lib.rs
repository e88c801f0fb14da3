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

//! The error taxonomy and diagnostic [`Handler`] for the lrx rule compiler.
//!
//! Every compile error is fatal to the current compile (§7 of the
//! specification): none are recovered locally, all propagate out of the
//! translator through `?` and are turned into a `LrxError` at the point
//! they're detected. The public entry point (`lrx_compile::compile`)
//! returns `Result<(), LrxError>` rather than calling `exit` itself, so
//! only the CLI binary decides how to turn a failure into a process exit
//! code.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use lrx_span::Span;

pub type Result<T> = std::result::Result<T, LrxError>;

/// The error taxonomy from the specification (§7). Each variant carries
/// the input line number where the problem was detected, except
/// `InputOpen`, which has no line to report.
#[derive(thiserror::Error, Debug)]
pub enum LrxError {
    #[error("cannot open rule file '{path}': {source}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not part of the distilled error taxonomy (§7 only covers
    /// reading/parsing the rule file), but the core still owns writing
    /// the artifact and `--graph` dump, so a failure there needs the
    /// same fatal, line-free shape as `InputOpen`.
    #[error("cannot write output '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("({span}): malformed XML: {message}")]
    XmlParse { span: Span, message: String },

    #[error("({span}): invalid node '<{element}>'")]
    UnexpectedElement { span: Span, element: String },

    #[error("({span}): <{action}> is not permitted inside <{context}>")]
    ForbiddenAction { span: Span, action: &'static str, context: &'static str },

    #[error("({span}): repeat bounds are invalid (from={from}, upto={upto})")]
    BadRepeatBounds { span: Span, from: i64, upto: i64 },

    #[error("({span}): sequence '{name}' is not defined")]
    UnknownSequence { span: Span, name: String },

    #[error("({span}): unexpected text outside of an element: '{text}'")]
    MalformedBody { span: Span, text: String },
}

impl LrxError {
    /// The input line the error was raised at, when one is available.
    pub fn span(&self) -> Option<Span> {
        match self {
            LrxError::InputOpen { .. } | LrxError::OutputWrite { .. } => None,
            LrxError::XmlParse { span, .. }
            | LrxError::UnexpectedElement { span, .. }
            | LrxError::ForbiddenAction { span, .. }
            | LrxError::BadRepeatBounds { span, .. }
            | LrxError::UnknownSequence { span, .. }
            | LrxError::MalformedBody { span, .. } => Some(*span),
        }
    }
}

/// Collects non-fatal diagnostics (currently: recogniser key collision
/// warnings, §9) emitted while a compile is in progress.
///
/// Unlike `LrxError`, nothing routed through the `Handler` aborts
/// compilation; it exists purely so that warnings surface to the
/// grammarian through the same channel a real deployment would use
/// (`tracing`), while still being inspectable in tests.
#[derive(Default)]
pub struct Handler {
    warnings: std::cell::RefCell<Vec<String>>,
}

impl Handler {
    pub fn new() -> Self {
        Handler::default()
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.borrow_mut().push(message);
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_records_warnings_it_emits() {
        let handler = Handler::new();
        handler.warn("recogniser key collision for <select>cat<n>");
        assert_eq!(handler.warnings(), vec!["recogniser key collision for <select>cat<n>".to_string()]);
    }

    #[test]
    fn errors_without_a_span_report_none() {
        let err = LrxError::InputOpen {
            path: PathBuf::from("rules.lrx"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        };
        assert!(err.span().is_none());
    }

    #[test]
    fn errors_with_a_span_report_it() {
        let err = LrxError::UnknownSequence { span: Span::new(12), name: "NP".to_string() };
        assert_eq!(err.span(), Some(Span::new(12)));
    }
}
