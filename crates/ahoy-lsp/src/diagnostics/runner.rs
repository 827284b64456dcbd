// Ahoy Language Server
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Diagnostic runner

use super::diagnostic::{codes, Diagnostic};
use super::rules::{default_passes, CheckContext, DiagnosticPass};
use crate::constants::DEFAULT_MAX_DIAGNOSTICS;
use crate::guard::contain;
use ahoy_syntax::ParseError;
use tracing::debug;

/// Runs every pass over one document and merges the parser's errors.
pub struct DiagnosticRunner {
    passes: Vec<Box<dyn DiagnosticPass>>,
    max_diagnostics: usize,
}

impl Default for DiagnosticRunner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIAGNOSTICS)
    }
}

impl DiagnosticRunner {
    /// Create a runner with the default passes.
    pub fn new(max_diagnostics: usize) -> Self {
        Self::with_passes(max_diagnostics, default_passes())
    }

    /// Create a runner with custom passes
    pub fn with_passes(max_diagnostics: usize, passes: Vec<Box<dyn DiagnosticPass>>) -> Self {
        Self {
            passes,
            max_diagnostics,
        }
    }

    pub fn passes(&self) -> impl Iterator<Item = &dyn DiagnosticPass> {
        self.passes.iter().map(|p| p.as_ref())
    }

    /// Run all passes.
    ///
    /// Syntax errors come first, then each pass's findings in pass order. A
    /// pass that panics contributes one `analysis-fault` diagnostic and the
    /// remaining passes still run. Past `max_diagnostics` the list is cut and a
    /// trailing warning says how many were dropped.
    pub fn run(&self, ctx: &CheckContext<'_>, parse_errors: &[ParseError]) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = parse_errors.iter().map(syntax_diagnostic).collect();

        for pass in &self.passes {
            match contain(|| pass.check(ctx)) {
                Ok(found) => {
                    debug!(pass = pass.id(), count = found.len(), "diagnostic pass finished");
                    diagnostics.extend(found);
                }
                Err(fault) => diagnostics.push(
                    Diagnostic::error(
                        codes::ANALYSIS_FAULT,
                        format!("Diagnostic pass '{}' failed: {}", pass.id(), fault),
                        1,
                    )
                    .with_columns(0, 1),
                ),
            }
        }

        if diagnostics.len() > self.max_diagnostics {
            let dropped = diagnostics.len() - self.max_diagnostics;
            diagnostics.truncate(self.max_diagnostics);
            diagnostics.push(Diagnostic::warning(
                codes::TOO_MANY_DIAGNOSTICS,
                format!(
                    "Diagnostic limit of {} reached; {} more not shown",
                    self.max_diagnostics, dropped
                ),
                1,
            ));
        }

        debug!(total = diagnostics.len(), "diagnostics collected");
        diagnostics
    }
}

/// Convert a parser error. Columns arrive 1-based.
fn syntax_diagnostic(err: &ParseError) -> Diagnostic {
    let start = err.column.saturating_sub(1);
    Diagnostic::syntax(&err.message, err.line.max(1)).with_columns(start, start + err.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisLimits;
    use crate::diagnostics::Severity;
    use crate::symbol_table::SymbolTable;
    use ahoy_syntax::{AhoyFrontend, Frontend};
    use ropey::Rope;

    struct Exploding;

    impl DiagnosticPass for Exploding {
        fn id(&self) -> &str {
            "exploding"
        }

        fn description(&self) -> &str {
            "Always panics"
        }

        fn check(&self, _ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
            panic!("pass blew up")
        }
    }

    struct Noisy(usize);

    impl DiagnosticPass for Noisy {
        fn id(&self) -> &str {
            "noisy"
        }

        fn description(&self) -> &str {
            "Reports every line"
        }

        fn check(&self, _ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
            (1..=self.0)
                .map(|line| Diagnostic::warning("noisy", "noise", line))
                .collect()
        }
    }

    fn run_with(source: &str, runner: &DiagnosticRunner) -> Vec<Diagnostic> {
        let frontend = AhoyFrontend::default();
        let (ast, errors) = frontend.parse(&frontend.tokenize(source));
        let limits = AnalysisLimits::default();
        let symbols = SymbolTable::build(&ast, limits.walk_limits());
        let text = Rope::from_str(source);
        let ctx = CheckContext {
            ast: &ast,
            symbols: &symbols,
            text: &text,
            limits: &limits,
        };
        runner.run(&ctx, &errors)
    }

    #[test]
    fn test_clean_source_has_no_diagnostics() {
        let source = "program demo\nfunc add x int y int -> int do\n  return x plus y\nend\nprint|add|1, 2||";
        assert!(run_with(source, &DiagnosticRunner::default()).is_empty());
    }

    #[test]
    fn test_passes_do_not_suppress_each_other() {
        let source = "PI :: 3.14\nPI: 1\nx int: \"s\"\npritn|x|";
        let diagnostics = run_with(source, &DiagnosticRunner::default());
        assert!(diagnostics.iter().all(|d| d.code().is_some()), "{diagnostics:?}");
        let found: Vec<_> = diagnostics.iter().filter_map(Diagnostic::code).collect();
        assert_eq!(
            found,
            vec![codes::CONST_REASSIGNMENT, codes::UNDEFINED_FUNCTION, codes::TYPE_MISMATCH]
        );
    }

    #[test]
    fn test_parse_errors_are_merged() {
        let diagnostics = run_with("func f x int\n  return 1\nend", &DiagnosticRunner::default());
        let syntax: Vec<_> = diagnostics.iter().filter(|d| d.code().is_none()).collect();
        assert_eq!(syntax.len(), 1);
        assert!(syntax[0].message().contains("expected 'do'"));
        assert_eq!(syntax[0].line(), 1);
        // Zero width, right after `int`.
        assert_eq!(syntax[0].columns(), (12, 12));
    }

    #[test]
    fn test_unexpected_token_covers_token() {
        let err = ParseError::new(2, 5, "expected an expression, found 'end'").with_width(3);
        let diagnostic = syntax_diagnostic(&err);
        assert_eq!(diagnostic.line(), 2);
        assert_eq!(diagnostic.columns(), (4, 7));
    }

    #[test]
    fn test_panicking_pass_is_contained() {
        let runner = DiagnosticRunner::with_passes(100, vec![Box::new(Exploding), Box::new(Noisy(2))]);
        let diagnostics = run_with("x: 1\ny: 2", &runner);
        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].code(), Some(codes::ANALYSIS_FAULT));
        assert_eq!(diagnostics[0].line(), 1);
        assert!(diagnostics[0].message().contains("pass blew up"));
        assert!(diagnostics[1..].iter().all(|d| d.code() == Some("noisy")));
    }

    #[test]
    fn test_cap_appends_warning() {
        let runner = DiagnosticRunner::with_passes(5, vec![Box::new(Noisy(12))]);
        let diagnostics = run_with("x: 1", &runner);
        assert_eq!(diagnostics.len(), 6);
        let last = diagnostics.last().expect("warning");
        assert_eq!(last.code(), Some(codes::TOO_MANY_DIAGNOSTICS));
        assert_eq!(last.severity(), Severity::Warning);
        assert!(last.message().contains("7 more"));
    }

    #[test]
    fn test_default_runner_has_all_passes() {
        assert_eq!(DiagnosticRunner::default().passes().count(), 8);
    }
}
