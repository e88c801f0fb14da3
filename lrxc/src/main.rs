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

//! `lrxc` — the command-line front end for the rule compiler.
//!
//! Argument parsing, locale setup, and turning a fatal [`lrx_errors::LrxError`]
//! into a process exit code are all external-collaborator concerns (§1,
//! §6); the actual compile lives in `lrx-compile` and never calls
//! `exit` itself.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lrxc", version, about = "Compile lrx lexical-selection rules into a weighted FST bundle")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a rule file into a binary FST bundle.
    Compile(CompileArgs),
}

#[derive(Args)]
struct CompileArgs {
    /// Path to the XML rule file.
    input: PathBuf,
    /// Path the compiled bundle is written to.
    output: PathBuf,
    /// Log a summary of the compiled transducer.
    #[arg(short, long)]
    debug: bool,
    /// Also write a human-readable dump of the main transducer here.
    #[arg(short = 'g', long = "graph", value_name = "PATH")]
    graph: Option<PathBuf>,
}

fn main() -> ExitCode {
    setup_locale();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Compile(args) => run_compile(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lrxc: {err}");
            ExitCode::FAILURE
        }
    }
}

/// The process locale is an external-collaborator responsibility (§6);
/// all rule text and symbol names are handled as UTF-8 regardless of
/// `LANG`/`LC_ALL`, so there is nothing to configure beyond leaving
/// the environment as the shell set it up.
fn setup_locale() {}

fn run_compile(args: CompileArgs) -> lrx_errors::Result<()> {
    let options = lrx_compile::CompileOptions { debug: args.debug, output_graph: args.graph };
    let warnings = lrx_compile::compile(&args.input, &args.output, &options)?;
    for warning in warnings {
        tracing::warn!("{warning}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::io::Write as _;

    #[test]
    fn compiles_an_empty_rule_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.lrx");
        let output = dir.path().join("empty.bin");
        std::fs::File::create(&input).unwrap().write_all(b"<rules/>").unwrap();

        Command::cargo_bin("lrxc").unwrap().args(["compile"]).arg(&input).arg(&output).assert().success();

        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn reports_a_missing_input_file_with_a_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.bin");

        Command::cargo_bin("lrxc")
            .unwrap()
            .args(["compile", "/nonexistent/rules.lrx"])
            .arg(&output)
            .assert()
            .failure()
            .stderr(predicate::str::contains("lrxc:"));
    }

    #[test]
    fn bad_repeat_bounds_fail_compilation() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.lrx");
        let output = dir.path().join("out.bin");
        std::fs::File::create(&input)
            .unwrap()
            .write_all(br#"<rules><rule><repeat from="2" upto="1"><match lemma="c"/></repeat></rule></rules>"#)
            .unwrap();

        Command::cargo_bin("lrxc")
            .unwrap()
            .args(["compile"])
            .arg(&input)
            .arg(&output)
            .assert()
            .failure()
            .stderr(predicate::str::contains("repeat bounds"));
    }
}
