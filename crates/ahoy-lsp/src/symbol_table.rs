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

//! Scope-aware symbol table.
//!
//! Scopes live in an arena owned by the [`SymbolTable`] and refer to each
//! other by [`ScopeId`]. A scope's parent link is only followed for lookup.
//! Symbols carry plain data (name, kind, type, position) and never point back
//! at their scope or at the syntax tree, so tearing a table down is a linear
//! pass over the arena.
//!
//! # Lifecycle
//!
//! A table is built by one walk over a complete tree ([`SymbolTable::build`]),
//! is read-only afterwards, and is torn down by [`SymbolTable::clear`]. `clear`
//! also runs on drop, so discarding a document always releases its scopes
//! eagerly.
//!
//! # Shadowing
//!
//! Names are unique per scope and the last declaration wins. Redeclaring a
//! name in the same scope silently replaces the earlier symbol.

use crate::inference::{infer_type, UNKNOWN_TYPE};
use ahoy_syntax::{AstNode, NodeKind, WalkLimits};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Index of a scope in the table's arena.
pub type ScopeId = usize;

/// The root scope of every table.
pub const GLOBAL_SCOPE: ScopeId = 0;

/// What a symbol declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Enum,
    EnumValue,
    Struct,
    StructField,
    Constant,
}

impl SymbolKind {
    /// Human-readable label used in hover text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Variable => "Variable",
            Self::Function => "Function",
            Self::Parameter => "Parameter",
            Self::Enum => "Enum",
            Self::EnumValue => "Enum Value",
            Self::Struct => "Struct",
            Self::StructField => "Struct Field",
            Self::Constant => "Constant",
        }
    }

    /// Kinds shown in the document outline.
    pub fn is_top_level(self) -> bool {
        matches!(
            self,
            Self::Function | Self::Enum | Self::Struct | Self::Constant | Self::Variable
        )
    }
}

/// A named declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared or inferred type; empty when unknown.
    pub ty: String,
    /// Line number (1-based).
    pub line: usize,
    /// Column number (1-based).
    pub column: usize,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: ty.into(),
            line,
            column,
        }
    }
}

/// A lexical region with its own namespace.
#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
    children: Vec<ScopeId>,
    start_line: usize,
    end_line: usize,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// Name-to-declaration index for one document.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
    limits: WalkLimits,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// An empty table with only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                start_line: 0,
                end_line: usize::MAX,
                ..Scope::default()
            }],
            current: GLOBAL_SCOPE,
            limits: WalkLimits::default(),
        }
    }

    /// Build a table from a complete syntax tree.
    pub fn build(ast: &AstNode, limits: WalkLimits) -> Self {
        let mut table = Self::new();
        table.limits = limits;
        table.walk(ast, 0);
        table.current = GLOBAL_SCOPE;
        table
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn walk(&mut self, node: &AstNode, depth: usize) {
        if depth > self.limits.max_depth {
            warn!(line = node.line, depth, "syntax tree too deep, skipping subtree");
            return;
        }
        if node.children.len() > self.limits.max_children {
            warn!(
                line = node.line,
                children = node.children.len(),
                "syntax node has too many children, skipping subtree"
            );
            return;
        }

        match node.kind {
            NodeKind::Function => self.function(node, depth),
            NodeKind::VariableDeclaration | NodeKind::Assignment => {
                self.declaration(node, SymbolKind::Variable, depth)
            }
            NodeKind::ConstantDeclaration => self.declaration(node, SymbolKind::Constant, depth),
            NodeKind::EnumDeclaration => {
                self.define(Symbol::new(&node.value, SymbolKind::Enum, "enum", node.line, node.column));
                for member in node.children.iter().filter(|c| c.kind == NodeKind::Identifier) {
                    self.define(Symbol::new(
                        &member.value,
                        SymbolKind::EnumValue,
                        &node.value,
                        member.line,
                        member.column,
                    ));
                }
            }
            NodeKind::StructDeclaration => {
                self.define(Symbol::new(&node.value, SymbolKind::Struct, "struct", node.line, node.column));
                for field in node.children.iter().filter(|c| c.kind == NodeKind::StructField) {
                    self.define(Symbol::new(
                        &field.value,
                        SymbolKind::StructField,
                        &field.declared_type,
                        field.line,
                        field.column,
                    ));
                }
            }
            kind if kind.introduces_scope() => {
                self.enter_scope(node.line, node.end_line);
                if kind == NodeKind::ForInArrayLoop {
                    if let Some(var) = node.child(0).filter(|c| c.kind == NodeKind::Identifier) {
                        self.define(Symbol::new(&var.value, SymbolKind::Variable, "any", var.line, var.column));
                    }
                }
                self.walk_children(node, depth);
                self.exit_scope();
            }
            _ => self.walk_children(node, depth),
        }
    }

    fn walk_children(&mut self, node: &AstNode, depth: usize) {
        for child in &node.children {
            self.walk(child, depth + 1);
        }
    }

    fn function(&mut self, node: &AstNode, depth: usize) {
        self.define(Symbol::new(
            &node.value,
            SymbolKind::Function,
            &node.declared_type,
            node.line,
            node.column,
        ));

        self.enter_scope(node.line, node.end_line);
        if let Some(params) = node.child(0).filter(|c| c.kind == NodeKind::Parameters) {
            for param in params.children.iter().take(self.limits.max_children) {
                self.define(Symbol::new(
                    &param.value,
                    SymbolKind::Parameter,
                    &param.declared_type,
                    param.line,
                    param.column,
                ));
            }
        }
        if let Some(body) = node.child(1) {
            self.walk(body, depth + 1);
        }
        self.exit_scope();
    }

    fn declaration(&mut self, node: &AstNode, kind: SymbolKind, depth: usize) {
        if !node.value.is_empty() {
            let ty = if node.has_declared_type() {
                node.declared_type.clone()
            } else {
                let inferred = match node.initializer() {
                    Some(init) => infer_type(init, self, self.current),
                    None => String::new(),
                };
                if inferred == UNKNOWN_TYPE {
                    String::new()
                } else {
                    inferred
                }
            };
            self.define(Symbol::new(&node.value, kind, ty, node.line, node.column));
        }
        self.walk_children(node, depth);
    }

    fn define(&mut self, symbol: Symbol) {
        if let Some(scope) = self.scopes.get_mut(self.current) {
            scope.symbols.insert(symbol.name.clone(), symbol);
        }
    }

    fn enter_scope(&mut self, start_line: usize, end_line: usize) {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            parent: Some(self.current),
            start_line,
            end_line,
            ..Scope::default()
        });
        if let Some(parent) = self.scopes.get_mut(self.current) {
            parent.children.push(id);
        }
        self.current = id;
    }

    fn exit_scope(&mut self) {
        self.current = self
            .scopes
            .get(self.current)
            .and_then(|s| s.parent)
            .unwrap_or(GLOBAL_SCOPE);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Look a name up from the current scope (global once built).
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.lookup_from(self.current, name)
    }

    /// Look a name up starting at `scope` and following parent links.
    pub fn lookup_from(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut next = Some(scope);
        while let Some(id) = next {
            let scope = self.scopes.get(id)?;
            if let Some(symbol) = scope.symbols.get(name) {
                return Some(symbol);
            }
            next = scope.parent;
        }
        None
    }

    /// Look a name up from the innermost scope containing `line` (1-based).
    pub fn lookup_at(&self, name: &str, line: usize) -> Option<&Symbol> {
        self.lookup_from(self.scope_at_line(line), name)
    }

    /// The innermost scope whose line span contains `line` (1-based).
    pub fn scope_at_line(&self, line: usize) -> ScopeId {
        let mut id = GLOBAL_SCOPE;
        while let Some(child) = self.scopes.get(id).and_then(|scope| {
            scope
                .children
                .iter()
                .copied()
                .find(|&c| self.scopes.get(c).is_some_and(|s| s.contains_line(line)))
        }) {
            id = child;
        }
        id
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// True when no scope holds a symbol.
    pub fn is_empty(&self) -> bool {
        self.scopes.iter().all(Scope::is_empty)
    }

    /// Every symbol in the table in declaration order, capped at `limit`.
    pub fn all_symbols(&self, limit: usize) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.scopes.iter().flat_map(|s| s.symbols.values()).collect();
        symbols.sort_by(|a, b| (a.line, a.column, &a.name).cmp(&(b.line, b.column, &b.name)));
        symbols.truncate(limit);
        symbols
    }

    /// Symbols visible from `line`, innermost declarations first.
    pub fn visible_at(&self, line: usize) -> Vec<&Symbol> {
        let mut seen = HashSet::new();
        let mut visible = Vec::new();
        let mut next = Some(self.scope_at_line(line));
        while let Some(id) = next {
            let Some(scope) = self.scopes.get(id) else {
                break;
            };
            let mut symbols: Vec<&Symbol> = scope.symbols.values().collect();
            symbols.sort_by(|a, b| a.name.cmp(&b.name));
            for symbol in symbols {
                if seen.insert(symbol.name.as_str()) {
                    visible.push(symbol);
                }
            }
            next = scope.parent;
        }
        visible
    }

    /// Names of all declared functions.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .scopes
            .iter()
            .flat_map(|s| s.symbols.values())
            .filter(|s| s.kind == SymbolKind::Function)
            .map(|s| s.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Sever every link and empty every scope. Safe to call repeatedly.
    pub fn clear(&mut self) {
        for scope in &mut self.scopes {
            scope.symbols.clear();
            scope.children.clear();
            scope.parent = None;
        }
        self.scopes.clear();
        self.current = GLOBAL_SCOPE;
    }
}

impl Drop for SymbolTable {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahoy_syntax::{AhoyFrontend, Frontend};

    fn table(source: &str) -> SymbolTable {
        let frontend = AhoyFrontend::default();
        let (ast, errors) = frontend.parse(&frontend.tokenize(source));
        assert!(errors.is_empty(), "{errors:?}");
        SymbolTable::build(&ast, WalkLimits::default())
    }

    #[test]
    fn test_function_and_parameters() {
        let table = table("func add x int y int -> int do\n  sum: x plus y\n  return sum\nend");
        let add = table.lookup("add").expect("function");
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!(add.ty, "int");

        assert!(table.lookup("x").is_none(), "parameters are not global");
        let x = table.lookup_at("x", 2).expect("parameter");
        assert_eq!(x.kind, SymbolKind::Parameter);
        assert_eq!(x.ty, "int");
        assert_eq!(table.lookup_at("sum", 3).map(|s| s.ty.as_str()), Some("int"));
    }

    #[test]
    fn test_inferred_variable_types() {
        let table = table("a: 1\nb: 2.5\nc: \"s\"\nd: [1]\ne: {\"k\": 1}\nf: a plus b\ng: a is 1\nh: 'c'");
        let ty = |name: &str| table.lookup(name).map(|s| s.ty.clone()).unwrap_or_default();
        assert_eq!(ty("a"), "int");
        assert_eq!(ty("b"), "float");
        assert_eq!(ty("c"), "string");
        assert_eq!(ty("d"), "array");
        assert_eq!(ty("e"), "dict");
        assert_eq!(ty("f"), "float");
        assert_eq!(ty("g"), "bool");
        assert_eq!(ty("h"), "char");
    }

    #[test]
    fn test_unknown_inference_leaves_type_empty() {
        let table = table("x: items[0]");
        assert_eq!(table.lookup("x").map(|s| s.ty.as_str()), Some(""));
    }

    #[test]
    fn test_last_declaration_wins() {
        let table = table("x: 1\nx: \"s\"");
        let x = table.lookup("x").expect("x");
        assert_eq!(x.ty, "string");
        assert_eq!(x.line, 2);
    }

    #[test]
    fn test_assignment_overwrites_constant_entry() {
        // Collisions are a diagnostic concern, not a table concern.
        let table = table("PI :: 3.14159\nPI: 1");
        let pi = table.lookup("PI").expect("PI");
        assert_eq!(pi.kind, SymbolKind::Variable);
        assert_eq!(pi.line, 2);
    }

    #[test]
    fn test_enum_members_typed_with_enum() {
        let table = table("Color enum:\n  RED GREEN\nend");
        assert_eq!(table.lookup("Color").map(|s| s.kind), Some(SymbolKind::Enum));
        let red = table.lookup("RED").expect("member");
        assert_eq!(red.kind, SymbolKind::EnumValue);
        assert_eq!(red.ty, "Color");
    }

    #[test]
    fn test_struct_fields() {
        let table = table("Point struct:\n  x int\n  y int\nend");
        let fields: Vec<_> = table
            .all_symbols(100)
            .into_iter()
            .filter(|s| s.kind == SymbolKind::StructField)
            .map(|s| (s.name.clone(), s.ty.clone()))
            .collect();
        assert_eq!(
            fields,
            vec![("x".to_string(), "int".to_string()), ("y".to_string(), "int".to_string())]
        );
    }

    #[test]
    fn test_block_scopes_and_loop_variable() {
        let table = table("loop item in items do\n  n: 1\nend\nif ok then\n  m: 2\nend");
        assert!(table.lookup("item").is_none());
        assert!(table.lookup("n").is_none());
        assert_eq!(table.lookup_at("item", 2).map(|s| s.ty.as_str()), Some("any"));
        assert!(table.lookup_at("m", 5).is_some());
        assert!(table.lookup_at("m", 2).is_none());
        assert_eq!(table.scope_count(), 3);
    }

    #[test]
    fn test_inner_lookup_reaches_globals() {
        let table = table("LIMIT :: 10\nfunc f -> int do\n  if true then\n    return LIMIT\n  end\nend");
        let scope = table.scope_at_line(4);
        assert_ne!(scope, GLOBAL_SCOPE);
        assert_eq!(table.lookup_from(scope, "LIMIT").map(|s| s.kind), Some(SymbolKind::Constant));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut table = table("x: 1\nfunc f do\nend");
        assert!(table.lookup("x").is_some());
        table.clear();
        assert!(table.lookup("x").is_none());
        assert!(table.lookup_at("f", 2).is_none());
        assert!(table.is_empty());
        table.clear();
        assert!(table.lookup("x").is_none());
        assert_eq!(table.scope_count(), 0);
    }

    #[test]
    fn test_depth_guard_skips_subtree() {
        let mut node = AstNode::new(NodeKind::Assignment, "deep", 50, 1)
            .with_children(vec![AstNode::new(NodeKind::Number, "1", 50, 7)]);
        for line in (2..50).rev() {
            node = AstNode::new(NodeKind::Block, "", line, 1).with_children(vec![node]);
        }
        let root = AstNode::new(NodeKind::Program, "", 1, 1)
            .with_children(vec![AstNode::new(NodeKind::Assignment, "shallow", 1, 1), node]);
        let limits = WalkLimits {
            max_depth: 10,
            max_children: 10,
        };
        let table = SymbolTable::build(&root, limits);
        assert!(table.lookup("shallow").is_some());
        assert!(table.lookup("deep").is_none());
    }

    #[test]
    fn test_fan_out_guard_skips_node() {
        let children = (0..20)
            .map(|i| AstNode::new(NodeKind::Assignment, format!("v{i}"), i + 1, 1))
            .collect();
        let root = AstNode::new(NodeKind::Program, "", 1, 1).with_children(children);
        let limits = WalkLimits {
            max_depth: 10,
            max_children: 5,
        };
        let table = SymbolTable::build(&root, limits);
        assert!(table.is_empty());
    }

    #[test]
    fn test_visible_at_prefers_inner() {
        let table = table("x: 1\nfunc f x string do\n  y: x\nend");
        let visible = table.visible_at(3);
        let x = visible.iter().find(|s| s.name == "x").expect("x");
        assert_eq!(x.kind, SymbolKind::Parameter);
        assert!(visible.iter().any(|s| s.name == "f"));
        assert_eq!(table.lookup_at("y", 3).map(|s| s.ty.as_str()), Some("string"));
    }
}
