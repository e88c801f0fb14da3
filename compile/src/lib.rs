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

//! The rule compiler's core: C3 (rule translator), C4 (rule registry),
//! and C5 (artifact writer), wired together behind a single
//! [`compile`] entry point.
//!
//! XML tokenisation, locale setup, and argument parsing are external
//! collaborators (§1); this crate's only input is an already-parsed
//! [`lrx_ast::Program`] and a filesystem path to read it from, and its
//! only output is the binary bundle plus an optional `--graph` dump.
//! Nothing here calls `std::process::exit`: every failure propagates
//! out through [`lrx_errors::Result`] so the CLI binary is the only
//! place that turns it into an exit code.

#![forbid(unsafe_code)]

mod registry;
mod translate;
mod write;

pub use registry::Registry;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use lrx_alphabet::Alphabet;
use lrx_ast::Program;
use lrx_errors::{Handler, LrxError, Result};
use lrx_fst::Transducer;

use translate::Translator;

/// Compiles an already-parsed rule tree into a main transducer,
/// registering named sequences, recognisers, and weights into
/// `registry` along the way. Exposed separately from [`compile`] so
/// structural/golden tests can inspect the registry and transducer
/// directly instead of round-tripping through a bundle's bytes.
pub fn compile_program(
    program: &Program,
    alphabet: &mut Alphabet,
    registry: &mut Registry,
    handler: &Handler,
) -> Result<Transducer> {
    Translator::new(alphabet, registry, handler).compile_program(program)
}

/// Knobs the CLI surface exposes on top of the mandatory input/output
/// paths (§6).
#[derive(Debug, Default, Clone)]
pub struct CompileOptions {
    /// Logs a summary of the compiled transducer at debug level.
    pub debug: bool,
    /// When set, also writes a human-readable dump of the main
    /// transducer (`lrx_fst::render`) to this path.
    pub output_graph: Option<PathBuf>,
}

/// Reads the rule file at `input`, compiles it, and writes the binary
/// bundle to `output` (§6). Returns the warnings collected along the
/// way (currently: recogniser key collisions, §9) so the caller can
/// decide how to surface them.
pub fn compile(input: &Path, output: &Path, options: &CompileOptions) -> Result<Vec<String>> {
    let program = lrx_ast::read_program(input)?;

    let mut alphabet = Alphabet::new();
    let mut registry = Registry::new();
    let handler = Handler::new();

    let main = compile_program(&program, &mut alphabet, &mut registry, &handler)?;

    if options.debug {
        tracing::debug!(
            states = main.size(),
            transitions = main.transition_count(),
            rules = registry.weights.len(),
            recognisers = registry.recognisers.len(),
            "compiled main transducer"
        );
    }

    if let Some(graph_path) = &options.output_graph {
        let file = File::create(graph_path)
            .map_err(|source| LrxError::OutputWrite { path: graph_path.clone(), source })?;
        let mut writer = BufWriter::new(file);
        lrx_fst::render(&main, &alphabet, &mut writer)
            .map_err(|source| LrxError::OutputWrite { path: graph_path.clone(), source })?;
    }

    let file =
        File::create(output).map_err(|source| LrxError::OutputWrite { path: output.to_path_buf(), source })?;
    let mut writer = BufWriter::new(file);
    write::write_bundle(&mut writer, &alphabet, &registry, &main)
        .map_err(|source| LrxError::OutputWrite { path: output.to_path_buf(), source })?;

    Ok(handler.warnings())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn compiling_an_empty_ruleset_writes_a_bundle_and_no_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.lrx");
        let output = dir.path().join("empty.bin");
        std::fs::File::create(&input).unwrap().write_all(b"<rules/>").unwrap();

        let warnings = compile(&input, &output, &CompileOptions::default()).unwrap();
        assert!(warnings.is_empty());
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn missing_input_file_is_a_fatal_input_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.bin");
        let err =
            compile(Path::new("/nonexistent/path.lrx"), &output, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, LrxError::InputOpen { .. }));
    }
}
