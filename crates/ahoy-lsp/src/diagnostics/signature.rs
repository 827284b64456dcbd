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

//! Function signatures derived from the syntax tree.
//!
//! Signatures are recomputed from the tree whenever a pass needs them and
//! are never stored on a document.

use ahoy_syntax::{walk, AstNode, NodeKind, Visit, WalkLimits};
use std::collections::HashMap;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Declared type, or empty.
    pub ty: String,
    pub has_default: bool,
}

/// The callable shape of a function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Parameters without a default value.
    pub required: usize,
    pub total: usize,
    /// Declared return types joined by `", "`, or empty.
    pub return_type: String,
}

impl FunctionSignature {
    /// Read the signature of a `Function` node.
    pub fn from_node(node: &AstNode) -> Option<Self> {
        if node.kind != NodeKind::Function {
            return None;
        }
        let parameters: Vec<Parameter> = node
            .child(0)
            .filter(|c| c.kind == NodeKind::Parameters)
            .map(|params| {
                params
                    .children
                    .iter()
                    .map(|p| Parameter {
                        name: p.value.clone(),
                        ty: p.declared_type.clone(),
                        has_default: !p.children.is_empty(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let required = parameters.iter().filter(|p| !p.has_default).count();
        Some(Self {
            name: node.value.clone(),
            total: parameters.len(),
            required,
            parameters,
            return_type: node.declared_type.clone(),
        })
    }

    /// True if a call with `count` arguments is acceptable.
    #[inline]
    pub fn accepts(&self, count: usize) -> bool {
        self.required <= count && count <= self.total
    }

    /// True if at least one parameter declares a type.
    pub fn has_typed_parameters(&self) -> bool {
        self.parameters.iter().any(|p| !p.ty.is_empty())
    }

    /// Source-like rendering, e.g. `func add x int y int -> int`.
    pub fn render(&self) -> String {
        let mut out = format!("func {}", self.name);
        for param in &self.parameters {
            out.push(' ');
            out.push_str(&param.name);
            if !param.ty.is_empty() {
                out.push(' ');
                out.push_str(&param.ty);
            }
            if param.has_default {
                out.push_str(" = …");
            }
        }
        if !self.return_type.is_empty() {
            out.push_str(" -> ");
            out.push_str(&self.return_type);
        }
        out
    }
}

/// Signatures of every function in the tree, keyed by name.
///
/// A later declaration of the same name replaces an earlier one.
pub fn collect_signatures(ast: &AstNode, limits: WalkLimits) -> HashMap<String, FunctionSignature> {
    let mut signatures = HashMap::new();
    walk(ast, limits, |node, _| {
        if let Some(signature) = FunctionSignature::from_node(node) {
            signatures.insert(signature.name.clone(), signature);
        }
        Visit::Continue
    });
    signatures
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahoy_syntax::{AhoyFrontend, Frontend};

    fn signatures(source: &str) -> HashMap<String, FunctionSignature> {
        let frontend = AhoyFrontend::default();
        let (ast, _) = frontend.parse(&frontend.tokenize(source));
        collect_signatures(&ast, WalkLimits::default())
    }

    #[test]
    fn test_required_and_total() {
        let sigs = signatures("func greet name string greeting string = \"hi\" -> string do\nend");
        let greet = &sigs["greet"];
        assert_eq!(greet.required, 1);
        assert_eq!(greet.total, 2);
        assert!(greet.accepts(1));
        assert!(greet.accepts(2));
        assert!(!greet.accepts(0));
        assert!(!greet.accepts(3));
        assert!(greet.has_typed_parameters());
    }

    #[test]
    fn test_render() {
        let sigs = signatures("func add x int y int -> int do return x plus y end");
        assert_eq!(sigs["add"].render(), "func add x int y int -> int");
    }

    #[test]
    fn test_untyped_parameters() {
        let sigs = signatures("func log a b do\nend");
        assert_eq!(sigs["log"].total, 2);
        assert!(!sigs["log"].has_typed_parameters());
        assert_eq!(sigs["log"].render(), "func log a b");
    }

    #[test]
    fn test_nested_functions_are_collected() {
        let sigs = signatures("func outer do\n  func inner do\n  end\nend");
        assert!(sigs.contains_key("outer"));
        assert!(sigs.contains_key("inner"));
    }
}
