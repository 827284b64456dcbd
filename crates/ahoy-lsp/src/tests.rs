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

//! Whole-pipeline tests for the Ahoy LSP.
//!
//! Each test runs the complete analysis on a source text and then exercises
//! one or more query modules against the resulting snapshot.

use crate::analysis::Document;
use crate::config::{AnalysisLimits, CodeActionLimits};
use ahoy_syntax::AhoyFrontend;
use tower_lsp::lsp_types::{Position, Url};

fn analyze(source: &str) -> Document {
    Document::analyze(
        Url::parse("file:///pipeline.ahoy").unwrap(),
        1,
        source,
        &AhoyFrontend::default(),
        &AnalysisLimits::default(),
    )
}

const INVENTORY: &str = r#"program inventory
? Track stock levels
import "std/io"

MAX_ITEMS :: 100
Status enum:
    IN_STOCK
    SOLD_OUT
end

Item struct:
    name string
    count int
end

func restock item Item amount int -> int do
    total: item.count plus amount
    if total greater MAX_ITEMS then
        return MAX_ITEMS
    elseif total lesser 0 then
        return 0
    end
    return total
end

items: [Item{name: "rope", count: 3}]
loop entry in items do
    print|f"{entry.name}"|
end
"#;

#[cfg(test)]
mod diagnostic_scenarios {
    use super::*;
    use crate::diagnostics::codes;

    fn codes_of(doc: &Document) -> Vec<&'static str> {
        doc.diagnostics.iter().filter_map(|d| d.code()).collect()
    }

    #[test]
    fn test_well_formed_program_is_clean() {
        let doc = analyze(INVENTORY);
        assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);
    }

    #[test]
    fn test_constant_reassignment_reported_once() {
        let doc = analyze("PI :: 3.14159\nx: 2\nPI: 1");
        let hits: Vec<_> = doc
            .diagnostics
            .iter()
            .filter(|d| d.code() == Some(codes::CONST_REASSIGNMENT))
            .collect();
        assert_eq!(hits.len(), 1, "{:?}", doc.diagnostics);
        assert_eq!(hits[0].line(), 3);
    }

    #[test]
    fn test_return_type_agreement() {
        let doc = analyze("func add x int y int -> int do return x plus y end");
        assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);

        let doc = analyze("func add x int y int -> int do return \"x\" end");
        assert_eq!(codes_of(&doc), vec![codes::RETURN_TYPE_MISMATCH]);
        let message = doc.diagnostics[0].message();
        assert!(message.contains("int") && message.contains("string"), "{message}");
    }

    #[test]
    fn test_syntax_errors_precede_semantic_ones() {
        let doc = analyze("x: 1\nprogram late\nif x\n  y: 2\nend");
        assert!(doc.diagnostics[0].code().is_none(), "{:?}", doc.diagnostics);
        assert!(codes_of(&doc).contains(&codes::PROGRAM_POSITION));
    }

    #[test]
    fn test_call_checks_share_one_signature() {
        let doc = analyze("func add x int y int -> int do\n  return x plus y\nend\na: add|1|\nb: add|1, \"2\"|");
        assert_eq!(codes_of(&doc), vec![codes::ARGUMENT_COUNT, codes::ARGUMENT_TYPE_MISMATCH]);
        assert_eq!(doc.diagnostics[0].line(), 4);
        assert_eq!(doc.diagnostics[1].line(), 5);
    }
}

#[cfg(test)]
mod query_scenarios {
    use super::*;
    use crate::builtins::STRING_METHODS;
    use crate::code_actions::get_code_actions;
    use crate::completion::get_completions;
    use crate::definition::get_definition;
    use crate::hover::get_hover;
    use crate::symbols::extract_symbols;
    use tower_lsp::lsp_types::{CodeActionOrCommand, HoverContents, Range};

    #[test]
    fn test_member_completion_after_string_variable() {
        let doc = analyze("myStr: \"ahoy\"\nmyStr.");
        let labels: Vec<String> = get_completions(&doc, Position::new(1, 6), &AnalysisLimits::default())
            .into_iter()
            .map(|item| item.label)
            .collect();
        assert_eq!(labels.len(), STRING_METHODS.len());
        assert!(!labels.iter().any(|label| label == "func" || label == "myStr"));
    }

    #[test]
    fn test_definition_and_hover_agree() {
        let doc = analyze(INVENTORY);
        let limits = AnalysisLimits::default();
        let use_site = Position::new(17, 27);

        let location = get_definition(&doc, use_site, &limits).expect("definition");
        assert_eq!(location.range.start.line, 4);

        let hover = get_hover(&doc, use_site, &limits).expect("hover");
        let HoverContents::Markup(markup) = hover.contents else {
            panic!("expected markdown hover");
        };
        assert!(markup.value.contains("MAX_ITEMS :: int"), "{}", markup.value);
        assert!(markup.value.contains("Defined at line 5"));
    }

    #[test]
    fn test_outline_lists_top_level_declarations() {
        let doc = analyze(INVENTORY);
        let names: Vec<String> = extract_symbols(&doc, &AnalysisLimits::default())
            .into_iter()
            .map(|symbol| symbol.name)
            .collect();
        for expected in ["MAX_ITEMS", "Status", "Item", "restock", "items"] {
            assert!(names.iter().any(|n| n == expected), "{expected} missing from {names:?}");
        }
        assert!(!names.iter().any(|n| n == "amount" || n == "IN_STOCK"), "{names:?}");
    }

    #[test]
    fn test_published_diagnostic_drives_quick_fix() {
        let doc = analyze("pritn|\"hello\"|");
        let diagnostics = doc.to_lsp_diagnostics();
        assert_eq!(diagnostics.len(), 1);

        let actions = get_code_actions(&doc, diagnostics[0].range, &diagnostics, &CodeActionLimits::default());
        let titles: Vec<&str> = actions
            .iter()
            .filter_map(|action| match action {
                CodeActionOrCommand::CodeAction(action) => Some(action.title.as_str()),
                CodeActionOrCommand::Command(_) => None,
            })
            .collect();
        assert!(titles.contains(&"Change to 'print'"), "{titles:?}");
    }

    #[test]
    fn test_queries_on_empty_document() {
        let doc = analyze("");
        let limits = AnalysisLimits::default();
        let origin = Position::new(0, 0);
        assert!(get_hover(&doc, origin, &limits).is_none());
        assert!(get_definition(&doc, origin, &limits).is_none());
        assert!(extract_symbols(&doc, &limits).is_empty());
        let range = Range::new(origin, origin);
        assert!(get_code_actions(&doc, range, &[], &CodeActionLimits::default()).is_empty());
    }
}

#[cfg(test)]
mod teardown {
    use super::*;
    use crate::error::AnalysisFault;
    use std::time::Duration;

    #[test]
    fn test_timed_out_document_answers_nothing() {
        let fault = AnalysisFault::TimedOut(Duration::from_secs(5));
        let doc = Document::faulted(Url::parse("file:///slow.ahoy").unwrap(), 1, INVENTORY, &fault);
        assert!(doc.ast.is_none());
        assert!(doc.tokens.is_empty());
        assert_eq!(doc.diagnostics.len(), 1);
        for name in ["MAX_ITEMS", "restock", "items", "Item"] {
            assert!(doc.symbols.lookup(name).is_none());
        }
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut doc = analyze(INVENTORY);
        assert!(doc.symbols.lookup("restock").is_some());
        doc.symbols.clear();
        doc.symbols.clear();
        assert!(doc.symbols.is_empty());
        assert!(doc.symbols.lookup("restock").is_none());
        assert!(doc.symbols.lookup_at("total", 17).is_none());
    }
}
