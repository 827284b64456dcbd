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

//! Abstract syntax tree for Ahoy programs.
//!
//! The tree is deliberately untyped at the node level: every node carries a
//! [`NodeKind`], a `value` (name, operator or literal text), an optional
//! declared type annotation and an ordered list of owned children. Consumers
//! index children by position; the layout per kind is documented on
//! [`NodeKind`].

use std::fmt;

/// The kind of an AST node and the layout of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Root. Children are top-level statements.
    Program,
    /// `program name`. `value` is the program name.
    ProgramDeclaration,
    /// `import "path"`. `value` is the path.
    Import,
    /// `value` is the name, `declared_type` the return types joined by `", "`.
    /// Children: `[Parameters, Block]`.
    Function,
    /// Children are `Parameter` nodes.
    Parameters,
    /// `value` is the name, `declared_type` the type. Optional child: default value.
    Parameter,
    /// A statement list.
    Block,
    /// `name type: expr`. Children: `[initializer]`.
    VariableDeclaration,
    /// `name: expr` with children `[initializer]`, or `target: expr` with an
    /// empty `value` and children `[target, initializer]`.
    Assignment,
    /// `NAME [type] :: expr`. Children: `[initializer]`.
    ConstantDeclaration,
    /// `value` is the enum name. Children are `Identifier` members.
    EnumDeclaration,
    /// `value` is the struct name. Children are `StructField` nodes.
    StructDeclaration,
    /// `value` is the field name, `declared_type` its type.
    StructField,
    /// Children: `[condition, Block, else?]` where `else` is a `Block` or a
    /// nested `If` for `elseif`/`anif`.
    If,
    /// Children: `[condition?, Block]`.
    WhileLoop,
    /// `loop i:a to b`. Children: `[Assignment, end, Block]`.
    ForRangeLoop,
    /// `loop i to b`. Children: `[Identifier, end, Block]`.
    ForCountLoop,
    /// `loop x in arr`. Children: `[Identifier, iterable, Block]`.
    ForInArrayLoop,
    /// `loop k, v in dict`. Children: `[Identifier, Identifier, iterable, Block]`.
    ForInDictLoop,
    /// Children are the returned expressions.
    Return,
    Break,
    Skip,
    /// `name|args|`. `value` is the callee name, children are arguments.
    Call,
    /// `recv.name|args|`. Children: `[receiver, args...]`.
    MethodCall,
    /// `recv.name`. Children: `[receiver]`.
    MemberAccess,
    /// `target[index]`. Children: `[target, index]`.
    IndexAccess,
    Identifier,
    /// Integer or float literal; `value` is the source text.
    Number,
    String,
    FString,
    Char,
    /// `value` is `"true"` or `"false"`.
    Boolean,
    /// Children are the elements.
    ArrayLiteral,
    /// Children are `DictEntry` nodes.
    DictLiteral,
    /// Children: `[key, value]` in a dict literal, `[value]` in a struct
    /// literal where `value` holds the field name.
    DictEntry,
    /// `Name{field: value}`. `value` is the struct name.
    StructLiteral,
    /// `value` is the operator text. Children: `[lhs, rhs]`.
    BinaryOp,
    /// `value` is the operator text. Children: `[operand]`.
    UnaryOp,
}

impl NodeKind {
    /// Kinds whose body introduces a new lexical scope.
    pub fn introduces_scope(self) -> bool {
        matches!(
            self,
            Self::Function
                | Self::If
                | Self::WhileLoop
                | Self::ForRangeLoop
                | Self::ForCountLoop
                | Self::ForInArrayLoop
                | Self::ForInDictLoop
        )
    }

    /// Literal expression kinds.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Number
                | Self::String
                | Self::FString
                | Self::Char
                | Self::Boolean
                | Self::ArrayLiteral
                | Self::DictLiteral
                | Self::StructLiteral
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::ProgramDeclaration => "program-declaration",
            Self::Import => "import",
            Self::Function => "function",
            Self::Parameters => "parameters",
            Self::Parameter => "parameter",
            Self::Block => "block",
            Self::VariableDeclaration => "variable-declaration",
            Self::Assignment => "assignment",
            Self::ConstantDeclaration => "constant-declaration",
            Self::EnumDeclaration => "enum-declaration",
            Self::StructDeclaration => "struct-declaration",
            Self::StructField => "struct-field",
            Self::If => "if",
            Self::WhileLoop => "while-loop",
            Self::ForRangeLoop => "for-range-loop",
            Self::ForCountLoop => "for-count-loop",
            Self::ForInArrayLoop => "for-in-array-loop",
            Self::ForInDictLoop => "for-in-dict-loop",
            Self::Return => "return",
            Self::Break => "break",
            Self::Skip => "skip",
            Self::Call => "call",
            Self::MethodCall => "method-call",
            Self::MemberAccess => "member-access",
            Self::IndexAccess => "index-access",
            Self::Identifier => "identifier",
            Self::Number => "number",
            Self::String => "string",
            Self::FString => "f-string",
            Self::Char => "char",
            Self::Boolean => "boolean",
            Self::ArrayLiteral => "array-literal",
            Self::DictLiteral => "dict-literal",
            Self::DictEntry => "dict-entry",
            Self::StructLiteral => "struct-literal",
            Self::BinaryOp => "binary-op",
            Self::UnaryOp => "unary-op",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AstNode {
    pub kind: NodeKind,
    /// Name, operator or literal text, depending on `kind`.
    pub value: String,
    /// Explicit type annotation, or empty.
    pub declared_type: String,
    /// Line number (1-based).
    pub line: usize,
    /// Column number (1-based).
    pub column: usize,
    /// Last line covered by the node (1-based, inclusive).
    pub end_line: usize,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(kind: NodeKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            declared_type: String::new(),
            line,
            column,
            end_line: line,
            children: Vec::new(),
        }
    }

    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    pub fn with_children(mut self, children: Vec<AstNode>) -> Self {
        if let Some(last) = children.iter().map(|c| c.end_line).max() {
            self.end_line = self.end_line.max(last);
        }
        self.children = children;
        self
    }

    pub fn push(&mut self, child: AstNode) {
        self.end_line = self.end_line.max(child.end_line);
        self.children.push(child);
    }

    #[inline]
    pub fn child(&self, index: usize) -> Option<&AstNode> {
        self.children.get(index)
    }

    /// The initializer expression of a declaration or assignment.
    pub fn initializer(&self) -> Option<&AstNode> {
        match self.kind {
            NodeKind::VariableDeclaration | NodeKind::ConstantDeclaration | NodeKind::Assignment => {
                self.children.last()
            }
            _ => None,
        }
    }

    /// The trailing `Block` child of a function, loop or branch.
    pub fn body(&self) -> Option<&AstNode> {
        self.children.iter().rev().find(|c| c.kind == NodeKind::Block)
    }

    #[inline]
    pub fn has_declared_type(&self) -> bool {
        !self.declared_type.is_empty()
    }
}

// Chained expressions can nest thousands of nodes deep; the derived drop
// would recurse once per level.
impl Drop for AstNode {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_extends_end_line() {
        let mut block = AstNode::new(NodeKind::Block, "", 2, 1);
        block.push(AstNode::new(NodeKind::Break, "", 5, 3));
        assert_eq!(block.end_line, 5);
    }

    #[test]
    fn test_initializer() {
        let decl = AstNode::new(NodeKind::VariableDeclaration, "x", 1, 1)
            .with_type("int")
            .with_children(vec![AstNode::new(NodeKind::Number, "1", 1, 9)]);
        assert_eq!(decl.initializer().map(|n| n.value.as_str()), Some("1"));
        assert!(AstNode::new(NodeKind::Call, "f", 1, 1).initializer().is_none());
    }

    #[test]
    fn test_scope_kinds() {
        assert!(NodeKind::Function.introduces_scope());
        assert!(NodeKind::ForInArrayLoop.introduces_scope());
        assert!(!NodeKind::Block.introduces_scope());
        assert!(!NodeKind::EnumDeclaration.introduces_scope());
    }

    #[test]
    fn test_drop_deep_tree() {
        let mut node = AstNode::new(NodeKind::Identifier, "a", 1, 1);
        for _ in 0..200_000 {
            node = AstNode::new(NodeKind::MemberAccess, "b", 1, 1).with_children(vec![node]);
        }
        drop(node);
    }
}
