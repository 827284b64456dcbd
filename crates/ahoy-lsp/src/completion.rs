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

//! Autocompletion.
//!
//! # Completion Contexts
//!
//! - **Member**: the prefix is preceded by `.`. What sits before the dot
//!   decides the members offered: a string, array or dict literal gives its
//!   built-in methods, an identifier is resolved through the symbol table.
//!   A member context that cannot be resolved yields nothing.
//! - **General**: keywords, word operators and visible declarations.
//!
//! ```text
//! name.up|          → string methods starting with "up" (if name is a string)
//! "text".|          → all string methods
//! p.|               → fields of p's struct type
//! lo|               → loop, local symbols starting with "lo"
//! ```

use crate::analysis::Document;
use crate::builtins::{methods_for, BuiltinMethod};
use crate::config::AnalysisLimits;
use crate::symbol_table::{Symbol, SymbolKind};
use crate::utils::{is_identifier_char, prefix_at};
use ahoy_syntax::{walk, AstNode, NodeKind, Visit};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, InsertTextFormat, Position};

const KEYWORDS: &[&str] = &[
    "if", "else", "elseif", "anif", "then", "loop", "in", "to", "do", "end", "func", "return", "switch", "on",
    "when", "import", "ahoy", "program", "is", "not", "and", "or", "break", "skip", "true", "false", "enum",
    "struct", "type", "int", "float", "string", "char", "bool", "dict", "array", "vector2", "color",
];

const WORD_OPERATORS: &[(&str, &str)] = &[
    ("plus", "addition operator (+)"),
    ("minus", "subtraction operator (-)"),
    ("times", "multiplication operator (*)"),
    ("div", "division operator (/)"),
    ("mod", "modulo operator (%)"),
    ("lesser", "less than operator (<)"),
    ("greater", "greater than operator (>)"),
];

/// What precedes a member access dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    StringLiteral,
    ArrayLiteral,
    DictLiteral,
    Identifier(String),
    /// Anything else, such as a call result.
    Unknown,
}

/// Completion context at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    Member { receiver: Receiver, prefix: String },
    General { prefix: String },
}

/// Classify the cursor position within a line.
pub fn get_context(line: &str, character: usize) -> CompletionContext {
    let chars: Vec<char> = line.chars().collect();
    let (prefix, start) = prefix_at(&chars, character);
    if start == 0 || chars[start - 1] != '.' {
        return CompletionContext::General { prefix };
    }

    let before = &chars[..start - 1];
    let receiver = match before.last() {
        Some('"') => Receiver::StringLiteral,
        Some(']') => Receiver::ArrayLiteral,
        Some('}') => Receiver::DictLiteral,
        Some(&c) if is_identifier_char(c) => {
            let (name, _) = prefix_at(before, before.len());
            Receiver::Identifier(name)
        }
        _ => Receiver::Unknown,
    };
    CompletionContext::Member { receiver, prefix }
}

/// Completion items at a position.
pub fn get_completions(doc: &Document, position: Position, limits: &AnalysisLimits) -> Vec<CompletionItem> {
    let Some(line) = doc.line(position.line) else {
        return Vec::new();
    };
    if line.chars().count() > limits.max_line_length {
        return Vec::new();
    }
    let line_number = position.line as usize + 1;

    match get_context(&line, position.character as usize) {
        CompletionContext::Member { receiver, prefix } => member_completions(doc, &receiver, line_number, limits)
            .into_iter()
            .filter(|item| item.label.starts_with(&prefix))
            .collect(),
        CompletionContext::General { prefix } => general_completions(doc, &prefix, line_number),
    }
}

fn member_completions(
    doc: &Document,
    receiver: &Receiver,
    line: usize,
    limits: &AnalysisLimits,
) -> Vec<CompletionItem> {
    let ty = match receiver {
        Receiver::StringLiteral => "string",
        Receiver::ArrayLiteral => "array",
        Receiver::DictLiteral => "dict",
        Receiver::Unknown => return Vec::new(),
        Receiver::Identifier(name) => match doc.symbols.lookup_at(name, line) {
            Some(symbol) if symbol.kind != SymbolKind::Constant => symbol.ty.as_str(),
            _ => return Vec::new(),
        },
    };

    if let Some(methods) = methods_for(ty) {
        return methods.iter().map(method_item).collect();
    }

    let is_struct = doc
        .symbols
        .lookup_at(ty, line)
        .is_some_and(|symbol| symbol.kind == SymbolKind::Struct);
    match doc.ast.as_ref() {
        Some(ast) if is_struct => struct_fields(ast, ty, limits),
        _ => Vec::new(),
    }
}

fn method_item(method: &BuiltinMethod) -> CompletionItem {
    CompletionItem {
        label: method.name.to_string(),
        kind: Some(CompletionItemKind::METHOD),
        detail: Some(method.detail.to_string()),
        insert_text: Some(method.snippet.to_string()),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        ..Default::default()
    }
}

/// Fields of the struct declaration named `name`.
fn struct_fields(ast: &AstNode, name: &str, limits: &AnalysisLimits) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    walk(ast, limits.walk_limits(), |node, _| {
        if node.kind != NodeKind::StructDeclaration {
            return Visit::Continue;
        }
        if node.value == name && items.is_empty() {
            items.extend(
                node.children
                    .iter()
                    .filter(|c| c.kind == NodeKind::StructField)
                    .map(|field| CompletionItem {
                        label: field.value.clone(),
                        kind: Some(CompletionItemKind::FIELD),
                        detail: (!field.declared_type.is_empty()).then(|| field.declared_type.clone()),
                        ..Default::default()
                    }),
            );
        }
        Visit::SkipChildren
    });
    items
}

fn general_completions(doc: &Document, prefix: &str, line: usize) -> Vec<CompletionItem> {
    let keywords = KEYWORDS
        .iter()
        .filter(|kw| kw.starts_with(prefix))
        .map(|kw| CompletionItem {
            label: kw.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            detail: Some("keyword".to_string()),
            ..Default::default()
        });

    let operators = WORD_OPERATORS
        .iter()
        .filter(|(op, _)| op.starts_with(prefix))
        .map(|(op, detail)| CompletionItem {
            label: op.to_string(),
            kind: Some(CompletionItemKind::OPERATOR),
            detail: Some(detail.to_string()),
            ..Default::default()
        });

    let symbols = doc
        .symbols
        .visible_at(line)
        .into_iter()
        .filter(|symbol| symbol.name.starts_with(prefix))
        .filter_map(symbol_item);

    keywords.chain(operators).chain(symbols).collect()
}

fn symbol_item(symbol: &Symbol) -> Option<CompletionItem> {
    let kind = match symbol.kind {
        SymbolKind::Function => CompletionItemKind::FUNCTION,
        SymbolKind::Variable | SymbolKind::Parameter => CompletionItemKind::VARIABLE,
        SymbolKind::Constant => CompletionItemKind::CONSTANT,
        SymbolKind::EnumValue => CompletionItemKind::ENUM_MEMBER,
        SymbolKind::Enum | SymbolKind::Struct | SymbolKind::StructField => return None,
    };
    let detail = match (symbol.kind, symbol.ty.is_empty()) {
        (_, true) => symbol.kind.label().to_string(),
        (SymbolKind::Function, false) => format!("func -> {}", symbol.ty),
        (_, false) => symbol.ty.clone(),
    };
    Some(CompletionItem {
        label: symbol.name.clone(),
        kind: Some(kind),
        detail: Some(detail),
        ..Default::default()
    })
}
