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

//! Document outline.
//!
//! The outline is a flat list of top-level declarations sorted by line. It
//! is built from the symbol table, which records no parent links, so no
//! hierarchy is reconstructed here.

use crate::analysis::Document;
use crate::config::AnalysisLimits;
use crate::definition::declaration_range;
use crate::symbol_table::SymbolKind;
use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind as LspSymbolKind};

/// Extract the document outline.
#[allow(deprecated)]
pub fn extract_symbols(doc: &Document, limits: &AnalysisLimits) -> Vec<DocumentSymbol> {
    doc.symbols
        .all_symbols(limits.max_listed_symbols)
        .into_iter()
        .filter(|symbol| symbol.kind.is_top_level())
        .map(|symbol| {
            let range = declaration_range(symbol);
            DocumentSymbol {
                name: symbol.name.clone(),
                detail: (!symbol.ty.is_empty()).then(|| symbol.ty.clone()),
                kind: lsp_kind(symbol.kind),
                tags: None,
                deprecated: None,
                range,
                selection_range: range,
                children: None,
            }
        })
        .collect()
}

fn lsp_kind(kind: SymbolKind) -> LspSymbolKind {
    match kind {
        SymbolKind::Function => LspSymbolKind::FUNCTION,
        SymbolKind::Variable => LspSymbolKind::VARIABLE,
        SymbolKind::Parameter => LspSymbolKind::VARIABLE,
        SymbolKind::Enum => LspSymbolKind::ENUM,
        SymbolKind::EnumValue => LspSymbolKind::ENUM_MEMBER,
        SymbolKind::Struct => LspSymbolKind::STRUCT,
        SymbolKind::StructField => LspSymbolKind::FIELD,
        SymbolKind::Constant => LspSymbolKind::CONSTANT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahoy_syntax::AhoyFrontend;
    use tower_lsp::lsp_types::Url;

    fn outline(source: &str) -> Vec<DocumentSymbol> {
        let doc = Document::analyze(
            Url::parse("file:///outline.ahoy").unwrap(),
            1,
            source,
            &AhoyFrontend::default(),
            &AnalysisLimits::default(),
        );
        extract_symbols(&doc, &AnalysisLimits::default())
    }

    #[test]
    fn test_flat_sorted_outline() {
        let source = "MAX :: 10\nPoint struct:\n  x int\n  y int\nend\nColor enum:\n  RED\nend\nfunc f a int do\n  local: 1\nend\ncount: 0";
        let names: Vec<_> = outline(source).into_iter().map(|s| (s.name, s.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("MAX".to_string(), LspSymbolKind::CONSTANT),
                ("Point".to_string(), LspSymbolKind::STRUCT),
                ("Color".to_string(), LspSymbolKind::ENUM),
                ("f".to_string(), LspSymbolKind::FUNCTION),
                ("local".to_string(), LspSymbolKind::VARIABLE),
                ("count".to_string(), LspSymbolKind::VARIABLE),
            ]
        );
        assert!(outline(source).iter().all(|s| s.children.is_none()));
    }

    #[test]
    fn test_detail_carries_type() {
        let symbols = outline("name: \"ahoy\"");
        assert_eq!(symbols[0].detail.as_deref(), Some("string"));
        assert_eq!(symbols[0].range.start.line, 0);
    }

    #[test]
    fn test_listing_cap() {
        let source: String = (0..50).map(|i| format!("v{i}: {i}\n")).collect();
        let doc = Document::analyze(
            Url::parse("file:///outline.ahoy").unwrap(),
            1,
            &source,
            &AhoyFrontend::default(),
            &AnalysisLimits::default(),
        );
        let limits = AnalysisLimits {
            max_listed_symbols: 10,
            ..AnalysisLimits::default()
        };
        assert_eq!(extract_symbols(&doc, &limits).len(), 10);
    }
}
