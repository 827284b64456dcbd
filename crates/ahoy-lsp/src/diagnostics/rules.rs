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

//! Semantic diagnostic passes.
//!
//! Each pass is independent: it reads the syntax tree and symbol table and
//! returns its own findings. No pass suppresses another, and duplicates across
//! passes are not merged.

use super::diagnostic::{codes, Diagnostic};
use super::signature::{collect_signatures, FunctionSignature};
use super::similarity::find_similar;
use crate::builtins::BUILTIN_FUNCTIONS;
use crate::config::AnalysisLimits;
use crate::constants::FALLBACK_RANGE_WIDTH;
use crate::inference::{infer_type, is_judgeable, GENERIC_TYPE, UNKNOWN_TYPE};
use crate::symbol_table::SymbolTable;
use crate::utils::line_len;
use ahoy_syntax::{walk, AstNode, NodeKind, Visit};
use ropey::Rope;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Everything a pass may read.
pub struct CheckContext<'a> {
    pub ast: &'a AstNode,
    pub symbols: &'a SymbolTable,
    pub text: &'a Rope,
    pub limits: &'a AnalysisLimits,
}

impl<'a> CheckContext<'a> {
    /// Bounded pre-order traversal of the whole tree.
    pub fn walk(&self, mut visitor: impl FnMut(&'a AstNode) -> Visit) {
        let report = walk(self.ast, self.limits.walk_limits(), |node, _| visitor(node));
        for truncation in &report.truncated {
            warn!(?truncation, "diagnostic walk skipped a subtree");
        }
    }

    /// Every node of `kind`, in source order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&'a AstNode> {
        let mut nodes = Vec::new();
        self.walk(|node| {
            if node.kind == kind {
                nodes.push(node);
            }
            Visit::Continue
        });
        nodes
    }

    /// Infer an expression's type from the scope enclosing `line`.
    pub fn infer_at(&self, expr: &AstNode, line: usize) -> String {
        infer_type(expr, self.symbols, self.symbols.scope_at_line(line))
    }

    /// Character length of a 1-based line.
    pub fn line_width(&self, line: usize) -> usize {
        line.checked_sub(1)
            .and_then(|index| line_len(self.text, index))
            .unwrap_or(FALLBACK_RANGE_WIDTH as usize)
    }
}

/// A diagnostic pass.
pub trait DiagnosticPass: Send + Sync {
    /// Pass identifier
    fn id(&self) -> &str;

    /// Pass description
    fn description(&self) -> &str;

    /// Run the pass
    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic>;
}

/// All passes, in publication order.
pub fn default_passes() -> Vec<Box<dyn DiagnosticPass>> {
    vec![
        Box::new(ProgramPosition),
        Box::new(ConstantCollisions),
        Box::new(ReturnTypes),
        Box::new(EnumDuplicates),
        Box::new(UndefinedFunctions),
        Box::new(ArgumentCount),
        Box::new(ArgumentTypes),
        Box::new(DeclaredTypes),
    ]
}

/// Span of a name starting at a node's 1-based column.
fn name_span(node: &AstNode, name: &str) -> (usize, usize) {
    let start = node.column.saturating_sub(1);
    (start, start + name.chars().count())
}

/// Span from a node's column to the end of its line.
fn rest_of_line(ctx: &CheckContext<'_>, node: &AstNode) -> (usize, usize) {
    let start = node.column.saturating_sub(1);
    (start, ctx.line_width(node.line).max(start))
}

/// True if a value of type `actual` may be used where `expected` is declared.
///
/// Integers widen to floats.
pub fn types_compatible(expected: &str, actual: &str) -> bool {
    expected == actual || (expected == "float" && actual == "int")
}

// ============================================================================
// Program declaration position
// ============================================================================

/// Rule: the program declaration must be the first code line.
pub struct ProgramPosition;

impl DiagnosticPass for ProgramPosition {
    fn id(&self) -> &str {
        codes::PROGRAM_POSITION
    }

    fn description(&self) -> &str {
        "Program declaration must be the first non-blank, non-comment line"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let Some(decl) = ctx
            .ast
            .children
            .iter()
            .find(|c| c.kind == NodeKind::ProgramDeclaration)
        else {
            return Vec::new();
        };

        let first_code_line = ctx
            .text
            .lines()
            .take(decl.line)
            .position(|line| {
                let text = line.to_string();
                let trimmed = text.trim();
                !trimmed.is_empty() && !trimmed.starts_with('?')
            })
            .map(|index| index + 1);

        if first_code_line == Some(decl.line) {
            return Vec::new();
        }
        vec![Diagnostic::error(
            codes::PROGRAM_POSITION,
            "Program declaration must be on the first line of the file",
            decl.line,
        )
        .with_columns(0, ctx.line_width(decl.line))]
    }
}

// ============================================================================
// Constant collisions
// ============================================================================

/// Rule: constants cannot be reassigned or redeclared.
pub struct ConstantCollisions;

impl DiagnosticPass for ConstantCollisions {
    fn id(&self) -> &str {
        "constant-collisions"
    }

    fn description(&self) -> &str {
        "Constants cannot be reassigned, redeclared or shadowed by variables"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let mut constants: HashMap<&str, usize> = HashMap::new();
        let mut diagnostics = Vec::new();

        // Pre-order traversal visits declarations in textual order.
        ctx.walk(|node| {
            let name = node.value.as_str();
            let earlier = constants.get(name).copied().filter(|&line| line < node.line);
            let (start, end) = name_span(node, name);
            match (node.kind, earlier) {
                (NodeKind::ConstantDeclaration, Some(line)) => diagnostics.push(
                    Diagnostic::error(
                        codes::CONST_REDECLARATION,
                        format!("Cannot redeclare constant '{name}' (declared at line {line})"),
                        node.line,
                    )
                    .with_columns(start, end),
                ),
                (NodeKind::ConstantDeclaration, None) => {
                    constants.entry(name).or_insert(node.line);
                }
                (NodeKind::Assignment, Some(line)) if !name.is_empty() => diagnostics.push(
                    Diagnostic::error(
                        codes::CONST_REASSIGNMENT,
                        format!("Cannot reassign constant '{name}' (declared at line {line})"),
                        node.line,
                    )
                    .with_columns(start, end),
                ),
                (NodeKind::VariableDeclaration, Some(line)) => diagnostics.push(
                    Diagnostic::error(
                        codes::CONST_REDECLARATION,
                        format!("Cannot declare variable '{name}': a constant with this name exists (line {line})"),
                        node.line,
                    )
                    .with_columns(start, end),
                ),
                _ => {}
            }
            Visit::Continue
        });

        diagnostics
    }
}

// ============================================================================
// Return types
// ============================================================================

/// Rule: returns must conform to the declared return type.
pub struct ReturnTypes;

impl ReturnTypes {
    /// Return statements of `func`, excluding those of nested functions.
    fn returns_of<'a>(ctx: &CheckContext<'a>, func: &'a AstNode) -> Vec<&'a AstNode> {
        let mut returns = Vec::new();
        let Some(body) = func.child(1) else {
            return returns;
        };
        let report = walk(body, ctx.limits.walk_limits(), |node, _| match node.kind {
            NodeKind::Function => Visit::SkipChildren,
            NodeKind::Return => {
                returns.push(node);
                Visit::SkipChildren
            }
            _ => Visit::Continue,
        });
        if !report.is_complete() {
            warn!(function = %func.value, "return check skipped part of a function body");
        }
        returns
    }
}

impl DiagnosticPass for ReturnTypes {
    fn id(&self) -> &str {
        "return-types"
    }

    fn description(&self) -> &str {
        "Return statements must match the declared return type"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for func in ctx.nodes_of_kind(NodeKind::Function) {
            if !func.has_declared_type() {
                continue;
            }
            let allowed: Vec<&str> = func.declared_type.split(',').map(str::trim).collect();
            let returns = Self::returns_of(ctx, func);

            if allowed == ["void"] {
                for ret in returns.iter().filter(|r| !r.children.is_empty()) {
                    let (start, end) = rest_of_line(ctx, ret);
                    diagnostics.push(
                        Diagnostic::error(
                            codes::VOID_RETURN_VALUE,
                            format!("Function '{}' is declared void but returns a value", func.value),
                            ret.line,
                        )
                        .with_columns(start, end),
                    );
                }
                continue;
            }

            if returns.is_empty() {
                let (start, end) = rest_of_line(ctx, func);
                diagnostics.push(
                    Diagnostic::error(
                        codes::MISSING_RETURN,
                        format!(
                            "Function '{}' declares return type '{}' but has no return statement",
                            func.value, func.declared_type
                        ),
                        func.line,
                    )
                    .with_columns(start, end),
                );
                continue;
            }

            if allowed.iter().any(|t| *t == GENERIC_TYPE || *t == "any") {
                continue;
            }
            for ret in returns {
                let mismatch = ret.children.iter().find_map(|value| {
                    let actual = ctx.infer_at(value, ret.line);
                    let conforms = !is_judgeable(&actual)
                        || allowed.iter().any(|expected| types_compatible(expected, &actual));
                    (!conforms).then_some(actual)
                });
                if let Some(actual) = mismatch {
                    let (start, end) = rest_of_line(ctx, ret);
                    diagnostics.push(
                        Diagnostic::error(
                            codes::RETURN_TYPE_MISMATCH,
                            format!(
                                "Function '{}' returns '{}' but its declared return type is '{}'",
                                func.value, actual, func.declared_type
                            ),
                            ret.line,
                        )
                        .with_columns(start, end),
                    );
                }
            }
        }

        diagnostics
    }
}

// ============================================================================
// Enum members
// ============================================================================

/// Rule: enum member names are unique within their enum.
pub struct EnumDuplicates;

impl DiagnosticPass for EnumDuplicates {
    fn id(&self) -> &str {
        codes::ENUM_DUPLICATE_MEMBER
    }

    fn description(&self) -> &str {
        "Enum members must be unique"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for decl in ctx.nodes_of_kind(NodeKind::EnumDeclaration) {
            let mut seen = HashSet::new();
            for member in decl.children.iter().filter(|c| c.kind == NodeKind::Identifier) {
                if !seen.insert(member.value.as_str()) {
                    let (start, end) = name_span(member, &member.value);
                    diagnostics.push(
                        Diagnostic::error(
                            codes::ENUM_DUPLICATE_MEMBER,
                            format!("Duplicate member '{}' in enum '{}'", member.value, decl.value),
                            member.line,
                        )
                        .with_columns(start, end),
                    );
                }
            }
        }
        diagnostics
    }
}

// ============================================================================
// Calls
// ============================================================================

/// Rule: called functions must exist.
pub struct UndefinedFunctions;

impl DiagnosticPass for UndefinedFunctions {
    fn id(&self) -> &str {
        codes::UNDEFINED_FUNCTION
    }

    fn description(&self) -> &str {
        "Called functions must be built-in or declared in the file"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let declared = ctx.symbols.function_names();
        let known: HashSet<&str> = declared.iter().copied().chain(BUILTIN_FUNCTIONS.iter().copied()).collect();
        let mut candidates: Vec<&str> = known.iter().copied().collect();
        candidates.sort_unstable();

        let mut diagnostics = Vec::new();
        for call in ctx.nodes_of_kind(NodeKind::Call) {
            if known.contains(call.value.as_str()) {
                continue;
            }
            let mut message = format!("Undefined function '{}'", call.value);
            if let Some(suggestion) = find_similar(&call.value, candidates.iter().copied()) {
                message.push_str(&format!(", did you mean '{suggestion}'?"));
            }
            let (start, end) = name_span(call, &call.value);
            diagnostics.push(
                Diagnostic::error(codes::UNDEFINED_FUNCTION, message, call.line).with_columns(start, end),
            );
        }
        diagnostics
    }
}

/// Rule: calls pass an acceptable number of arguments.
pub struct ArgumentCount;

impl DiagnosticPass for ArgumentCount {
    fn id(&self) -> &str {
        codes::ARGUMENT_COUNT
    }

    fn description(&self) -> &str {
        "Calls must pass between the required and total parameter count"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let signatures = collect_signatures(ctx.ast, ctx.limits.walk_limits());
        let mut diagnostics = Vec::new();
        for call in ctx.nodes_of_kind(NodeKind::Call) {
            let Some(signature) = signatures.get(&call.value) else {
                continue;
            };
            let count = call.children.len();
            if signature.accepts(count) {
                continue;
            }
            let expected = if signature.required == signature.total {
                format!("{}", signature.total)
            } else {
                format!("{} to {}", signature.required, signature.total)
            };
            let (start, end) = name_span(call, &call.value);
            diagnostics.push(
                Diagnostic::error(
                    codes::ARGUMENT_COUNT,
                    format!(
                        "Function '{}' expects {} argument{} but got {}",
                        call.value,
                        expected,
                        if signature.total == 1 { "" } else { "s" },
                        count
                    ),
                    call.line,
                )
                .with_columns(start, end),
            );
        }
        diagnostics
    }
}

/// Rule: argument types match declared parameter types.
pub struct ArgumentTypes;

impl ArgumentTypes {
    fn render_types<'t>(types: impl Iterator<Item = &'t str>) -> String {
        types
            .map(|t| if t.is_empty() { UNKNOWN_TYPE } else { t })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn check_call(ctx: &CheckContext<'_>, call: &AstNode, signature: &FunctionSignature) -> Option<Diagnostic> {
        let actual: Vec<String> = call.children.iter().map(|arg| ctx.infer_at(arg, call.line)).collect();
        let mismatch = signature.parameters.iter().zip(&actual).any(|(param, actual)| {
            is_judgeable(&param.ty) && is_judgeable(actual) && !types_compatible(&param.ty, actual)
        });
        if !mismatch {
            return None;
        }
        let expected = Self::render_types(signature.parameters.iter().map(|p| p.ty.as_str()));
        let actual = Self::render_types(actual.iter().map(String::as_str));
        let (start, end) = name_span(call, &call.value);
        Some(
            Diagnostic::error(
                codes::ARGUMENT_TYPE_MISMATCH,
                format!(
                    "Function '{}' expects argument types ({}) but got ({})",
                    call.value, expected, actual
                ),
                call.line,
            )
            .with_columns(start, end),
        )
    }
}

impl DiagnosticPass for ArgumentTypes {
    fn id(&self) -> &str {
        codes::ARGUMENT_TYPE_MISMATCH
    }

    fn description(&self) -> &str {
        "Arguments must match declared parameter types"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let signatures = collect_signatures(ctx.ast, ctx.limits.walk_limits());
        ctx.nodes_of_kind(NodeKind::Call)
            .into_iter()
            .filter_map(|call| {
                let signature = signatures.get(&call.value)?;
                if !signature.has_typed_parameters() {
                    return None;
                }
                Self::check_call(ctx, call, signature)
            })
            .collect()
    }
}

// ============================================================================
// Declared types
// ============================================================================

/// Rule: annotated declarations are initialized with a matching type.
pub struct DeclaredTypes;

impl DiagnosticPass for DeclaredTypes {
    fn id(&self) -> &str {
        codes::TYPE_MISMATCH
    }

    fn description(&self) -> &str {
        "Initializers must match the declared type"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        ctx.walk(|node| {
            let is_declaration = matches!(
                node.kind,
                NodeKind::VariableDeclaration | NodeKind::ConstantDeclaration
            );
            if !is_declaration || !is_judgeable(&node.declared_type) {
                return Visit::Continue;
            }
            let Some(init) = node.initializer() else {
                return Visit::Continue;
            };
            let actual = ctx.infer_at(init, node.line);
            if is_judgeable(&actual) && !types_compatible(&node.declared_type, &actual) {
                let (start, end) = rest_of_line(ctx, node);
                diagnostics.push(
                    Diagnostic::error(
                        codes::TYPE_MISMATCH,
                        format!(
                            "Type mismatch: '{}' is declared as '{}' but initialized with '{}'",
                            node.value, node.declared_type, actual
                        ),
                        node.line,
                    )
                    .with_columns(start, end),
                );
            }
            Visit::Continue
        });
        diagnostics
    }
}
