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

//! Quick fixes and refactors.
//!
//! Quick fixes match the diagnostics sent with the request, by code where one
//! exists and by message text for syntax errors. Refactors look only at the
//! raw text of the first line of the requested range.
//!
//! Work is bounded by [`CodeActionLimits`]; the server additionally runs this
//! under the request deadline and answers with an empty list if it expires.

use crate::analysis::Document;
use crate::config::CodeActionLimits;
use crate::diagnostics::codes;
use crate::utils::clamp_u32;
use ahoy_syntax::{walk, NodeKind, Visit, WalkLimits};
use std::collections::HashMap;
use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Diagnostic, NumberOrString, Position, Range, TextEdit,
    WorkspaceEdit,
};
use tracing::debug;

const WORD_OPERATORS: &[(&str, &str)] = &[(" plus ", " + "), (" minus ", " - "), (" times ", " * "), (" is ", " == ")];

/// Code actions for a range and the diagnostics the client attached to it.
pub fn get_code_actions(
    doc: &Document,
    range: Range,
    diagnostics: &[Diagnostic],
    limits: &CodeActionLimits,
) -> Vec<CodeActionOrCommand> {
    let mut actions = Vec::new();

    for diagnostic in diagnostics.iter().take(limits.max_diagnostics) {
        actions.extend(quick_fixes(doc, diagnostic));
        if actions.len() >= limits.quick_fix_limit {
            break;
        }
    }

    if actions.len() < limits.context_threshold {
        actions.extend(context_actions(doc, range, limits));
    }

    actions.truncate(limits.max_actions);
    debug!(uri = %doc.uri, count = actions.len(), "code actions computed");
    actions.into_iter().map(CodeActionOrCommand::CodeAction).collect()
}

fn code_of(diagnostic: &Diagnostic) -> Option<&str> {
    match diagnostic.code.as_ref()? {
        NumberOrString::String(code) => Some(code),
        NumberOrString::Number(_) => None,
    }
}

fn quick_fixes(doc: &Document, diagnostic: &Diagnostic) -> Vec<CodeAction> {
    let message = diagnostic.message.as_str();
    let code = code_of(diagnostic);
    let end = diagnostic.range.end;
    let mut actions = Vec::new();

    if code == Some(codes::PROGRAM_POSITION) || message.contains("Program declaration must be on the first line") {
        actions.extend(move_program_to_top(doc, diagnostic));
    }
    if message.contains("expected 'do'") || message.contains("missing 'do'") {
        actions.push(fix(doc, diagnostic, "Add 'do' keyword", insert(end, " do")));
    }
    if message.contains("expected 'end'") || message.contains("missing 'end'") {
        let next_line = Position::new(end.line.saturating_add(1), 0);
        actions.push(fix(doc, diagnostic, "Add 'end' keyword", insert(next_line, "end\n")));
    }
    if message.contains("expected 'then'") || message.contains("missing 'then'") {
        actions.push(fix(doc, diagnostic, "Add 'then' keyword", insert(end, " then")));
    }
    if message.contains("expected ':'") || message.contains("missing assignment") {
        let edit = TextEdit::new(diagnostic.range, ": ".to_string());
        actions.push(fix(doc, diagnostic, "Add ':' for assignment", vec![edit]));
    }
    if code == Some(codes::UNDEFINED_FUNCTION) {
        if let Some(suggestion) = suggested_name(message) {
            let edit = TextEdit::new(diagnostic.range, suggestion.to_string());
            actions.push(fix(doc, diagnostic, &format!("Change to '{suggestion}'"), vec![edit]));
        }
    }

    actions
}

/// The name in a "did you mean 'x'?" suffix.
fn suggested_name(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("did you mean '")?;
    let (name, _) = rest.split_once('\'')?;
    (!name.is_empty()).then_some(name)
}

fn insert(position: Position, text: &str) -> Vec<TextEdit> {
    vec![TextEdit::new(Range::new(position, position), text.to_string())]
}

fn workspace_edit(doc: &Document, edits: Vec<TextEdit>) -> WorkspaceEdit {
    WorkspaceEdit {
        changes: Some(HashMap::from([(doc.uri.clone(), edits)])),
        ..Default::default()
    }
}

fn fix(doc: &Document, diagnostic: &Diagnostic, title: &str, edits: Vec<TextEdit>) -> CodeAction {
    CodeAction {
        title: title.to_string(),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(workspace_edit(doc, edits)),
        ..Default::default()
    }
}

fn refactor(doc: &Document, title: &str, edits: Vec<TextEdit>) -> CodeAction {
    CodeAction {
        title: title.to_string(),
        kind: Some(CodeActionKind::REFACTOR),
        edit: Some(workspace_edit(doc, edits)),
        ..Default::default()
    }
}

/// Delete the program declaration's line and re-insert it at the top.
fn move_program_to_top(doc: &Document, diagnostic: &Diagnostic) -> Option<CodeAction> {
    let ast = doc.ast.as_ref()?;
    let mut line = None;
    walk(ast, WalkLimits::default(), |node, _| {
        if line.is_some() {
            return Visit::SkipChildren;
        }
        if node.kind == NodeKind::ProgramDeclaration {
            line = Some(node.line);
        }
        Visit::Continue
    });
    let line = line.filter(|&l| l > 1)?;

    let index = clamp_u32(line - 1);
    let text = doc.line(index)?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let edits = vec![
        TextEdit::new(
            Range::new(Position::new(index, 0), Position::new(index.saturating_add(1), 0)),
            String::new(),
        ),
        TextEdit::new(Range::new(Position::new(0, 0), Position::new(0, 0)), format!("{text}\n\n")),
    ];
    Some(fix(doc, diagnostic, "Move program declaration to top of file", edits))
}

fn context_actions(doc: &Document, range: Range, limits: &CodeActionLimits) -> Vec<CodeAction> {
    let line_index = range.start.line;
    let Some(line) = doc.line(line_index) else {
        return Vec::new();
    };
    if line.chars().count() > limits.max_line_length {
        return Vec::new();
    }

    let mut actions = Vec::new();
    if line.contains("func ") {
        let start = Position::new(line_index, 0);
        actions.push(refactor(
            doc,
            "Add function documentation",
            insert(start, "? Function description\n"),
        ));
    }

    if WORD_OPERATORS.iter().any(|(word, _)| line.contains(word)) {
        let converted = WORD_OPERATORS
            .iter()
            .fold(line.clone(), |text, (word, symbol)| text.replace(word, symbol));
        let whole_line = Range::new(
            Position::new(line_index, 0),
            Position::new(line_index, clamp_u32(line.chars().count())),
        );
        actions.push(refactor(
            doc,
            "Convert word operators to symbols",
            vec![TextEdit::new(whole_line, converted)],
        ));
    }

    actions
}
