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

//! Analysed document snapshots.
//!
//! A [`Document`] is built once by running the whole pipeline (tokenize,
//! parse, build the symbol table, run the diagnostic passes) and is never
//! mutated afterwards. The document store publishes it behind an `Arc`, so a
//! reader always sees a tree, table and diagnostic list from the same run.

use crate::config::AnalysisLimits;
use crate::diagnostics::{codes, CheckContext, Diagnostic, DiagnosticRunner};
use crate::error::AnalysisFault;
use crate::symbol_table::SymbolTable;
use crate::utils::line_text;
use ahoy_syntax::{AstNode, Frontend, ParseError, Token};
use ropey::Rope;
use tower_lsp::lsp_types::{self, Url};
use tracing::debug;

/// One analysed version of an open file.
#[derive(Debug)]
pub struct Document {
    pub uri: Url,
    pub version: i32,
    /// Content with a cached line index.
    pub text: Rope,
    pub tokens: Vec<Token>,
    /// `None` when the pipeline faulted.
    pub ast: Option<AstNode>,
    pub parse_errors: Vec<ParseError>,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    /// Run the full pipeline over `content`.
    pub fn analyze(uri: Url, version: i32, content: &str, frontend: &dyn Frontend, limits: &AnalysisLimits) -> Self {
        let text = Rope::from_str(content);
        let tokens = frontend.tokenize(content);
        let (ast, parse_errors) = frontend.parse(&tokens);
        let symbols = SymbolTable::build(&ast, limits.walk_limits());

        let diagnostics = {
            let ctx = CheckContext {
                ast: &ast,
                symbols: &symbols,
                text: &text,
                limits,
            };
            DiagnosticRunner::new(limits.max_diagnostics).run(&ctx, &parse_errors)
        };

        debug!(
            %uri,
            version,
            tokens = tokens.len(),
            parse_errors = parse_errors.len(),
            diagnostics = diagnostics.len(),
            "document analysed"
        );

        Self {
            uri,
            version,
            text,
            tokens,
            ast: Some(ast),
            parse_errors,
            symbols,
            diagnostics,
        }
    }

    /// The degraded document left behind when the pipeline faulted: no tree,
    /// an empty symbol table and one diagnostic explaining why.
    pub fn faulted(uri: Url, version: i32, content: &str, fault: &AnalysisFault) -> Self {
        let diagnostic = match fault {
            AnalysisFault::TimedOut(deadline) => Diagnostic::error(
                codes::ANALYSIS_TIMEOUT,
                format!("Analysis timed out after {deadline:?}; the file may be too complex"),
                1,
            ),
            AnalysisFault::Panicked(message) => Diagnostic::error(
                codes::ANALYSIS_FAULT,
                format!("Internal parser error: {message}"),
                1,
            ),
            AnalysisFault::Cancelled => {
                Diagnostic::error(codes::ANALYSIS_FAULT, "Analysis was cancelled", 1)
            }
        };

        Self {
            uri,
            version,
            text: Rope::from_str(content),
            tokens: Vec::new(),
            ast: None,
            parse_errors: Vec::new(),
            symbols: SymbolTable::new(),
            diagnostics: vec![diagnostic.with_columns(0, 1)],
        }
    }

    /// Text of a 0-based line.
    pub fn line(&self, line: u32) -> Option<String> {
        line_text(&self.text, line as usize)
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    pub fn is_faulted(&self) -> bool {
        self.ast.is_none()
    }

    /// Convert to LSP diagnostics.
    pub fn to_lsp_diagnostics(&self) -> Vec<lsp_types::Diagnostic> {
        self.diagnostics.iter().map(Diagnostic::to_lsp).collect()
    }
}
