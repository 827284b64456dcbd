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

//! Go-to-definition within one document.

use crate::analysis::Document;
use crate::config::AnalysisLimits;
use crate::symbol_table::Symbol;
use crate::utils::{clamp_u32, line_range, to_lsp_column, to_lsp_line, word_at};
use tower_lsp::lsp_types::{Location, Position, Range};

/// The declaration of the identifier under the cursor.
pub fn get_definition(doc: &Document, position: Position, limits: &AnalysisLimits) -> Option<Location> {
    let line = doc.line(position.line)?;
    if line.chars().count() > limits.max_line_length {
        return None;
    }
    let (word, _, _) = word_at(&line, position.character as usize)?;
    let symbol = doc.symbols.lookup_at(&word, position.line as usize + 1)?;
    Some(Location {
        uri: doc.uri.clone(),
        range: declaration_range(symbol),
    })
}

/// Range of a symbol's name at its declaration.
pub fn declaration_range(symbol: &Symbol) -> Range {
    let start = to_lsp_column(symbol.column);
    let end = start.saturating_add(clamp_u32(symbol.name.chars().count()));
    line_range(to_lsp_line(symbol.line), start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahoy_syntax::AhoyFrontend;
    use tower_lsp::lsp_types::Url;

    fn definition(source: &str, line: u32, character: u32) -> Option<Location> {
        let doc = Document::analyze(
            Url::parse("file:///def.ahoy").unwrap(),
            1,
            source,
            &AhoyFrontend::default(),
            &AnalysisLimits::default(),
        );
        get_definition(&doc, Position { line, character }, &AnalysisLimits::default())
    }

    #[test]
    fn test_function_definition() {
        let location = definition("func greet do\nend\ngreet||", 2, 2).expect("definition");
        assert_eq!(location.uri.as_str(), "file:///def.ahoy");
        assert_eq!(location.range.start, Position { line: 0, character: 5 });
        assert_eq!(location.range.end, Position { line: 0, character: 10 });
    }

    #[test]
    fn test_parameter_shadows_global() {
        let source = "x: 1\nfunc f x int do\n  y: x\nend";
        let location = definition(source, 2, 5).expect("definition");
        assert_eq!(location.range.start, Position { line: 1, character: 7 });
    }

    #[test]
    fn test_unknown_word() {
        assert!(definition("y: missing", 0, 5).is_none());
        assert!(definition("y: 1", 0, 2).is_none());
    }
}
