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

//! Best-effort, syntax-directed type inference.
//!
//! The result is a type name or [`UNKNOWN_TYPE`]. Consumers treat
//! [`UNKNOWN_TYPE`] as "cannot judge" and never report a problem based on it.

use crate::constants::MAX_AST_DEPTH;
use crate::symbol_table::{ScopeId, SymbolTable};
use ahoy_syntax::{AstNode, NodeKind};

/// Returned whenever a type cannot be determined.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Wildcard type accepted everywhere.
pub const GENERIC_TYPE: &str = "generic";

const ARITHMETIC_OPS: &[&str] = &["plus", "minus", "times", "div", "mod", "+", "-", "*", "/", "%"];
const COMPARISON_OPS: &[&str] = &["is", "==", "!=", "<", ">", "<=", ">=", "lesser", "greater"];
const LOGICAL_OPS: &[&str] = &["and", "or"];

/// Conversion built-ins whose call type is their own name.
const CONVERSIONS: &[&str] = &["int", "float", "string", "bool", "char"];

/// Infer the type of `expr`, resolving names from `scope` outward.
pub fn infer_type(expr: &AstNode, table: &SymbolTable, scope: ScopeId) -> String {
    infer_bounded(expr, table, scope, 0)
}

/// True if `ty` is concrete enough to compare against another type.
pub fn is_judgeable(ty: &str) -> bool {
    !ty.is_empty() && ty != UNKNOWN_TYPE && ty != GENERIC_TYPE && ty != "any"
}

fn infer_bounded(expr: &AstNode, table: &SymbolTable, scope: ScopeId, depth: usize) -> String {
    if depth > MAX_AST_DEPTH {
        return UNKNOWN_TYPE.to_string();
    }

    match expr.kind {
        NodeKind::Number => {
            if expr.value.contains('.') {
                "float".to_string()
            } else {
                "int".to_string()
            }
        }
        NodeKind::String | NodeKind::FString => "string".to_string(),
        NodeKind::Char => "char".to_string(),
        NodeKind::Boolean => "bool".to_string(),
        NodeKind::ArrayLiteral => "array".to_string(),
        NodeKind::DictLiteral => "dict".to_string(),
        NodeKind::StructLiteral => expr.value.clone(),
        NodeKind::Identifier | NodeKind::Call => match table.lookup_from(scope, &expr.value) {
            Some(symbol) => resolved(&symbol.ty),
            None if expr.kind == NodeKind::Call && CONVERSIONS.contains(&expr.value.as_str()) => {
                expr.value.clone()
            }
            None => UNKNOWN_TYPE.to_string(),
        },
        NodeKind::BinaryOp => {
            let op = expr.value.as_str();
            if COMPARISON_OPS.contains(&op) || LOGICAL_OPS.contains(&op) {
                return "bool".to_string();
            }
            if !ARITHMETIC_OPS.contains(&op) {
                return UNKNOWN_TYPE.to_string();
            }
            let (Some(lhs), Some(rhs)) = (expr.child(0), expr.child(1)) else {
                return UNKNOWN_TYPE.to_string();
            };
            let lhs = infer_bounded(lhs, table, scope, depth + 1);
            let rhs = infer_bounded(rhs, table, scope, depth + 1);
            if lhs == "float" || rhs == "float" {
                "float".to_string()
            } else if lhs == "int" || rhs == "int" {
                "int".to_string()
            } else {
                UNKNOWN_TYPE.to_string()
            }
        }
        NodeKind::UnaryOp => match (expr.value.as_str(), expr.child(0)) {
            ("not" | "!", _) => "bool".to_string(),
            ("-", Some(operand)) => infer_bounded(operand, table, scope, depth + 1),
            _ => UNKNOWN_TYPE.to_string(),
        },
        _ => UNKNOWN_TYPE.to_string(),
    }
}

/// Map a symbol's stored type to something callers can compare.
///
/// Empty, wildcard and multi-value types cannot be judged.
fn resolved(ty: &str) -> String {
    if is_judgeable(ty) && !ty.contains(',') {
        ty.to_string()
    } else {
        UNKNOWN_TYPE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol_table::GLOBAL_SCOPE;
    use ahoy_syntax::{AhoyFrontend, Frontend, WalkLimits};

    /// Infer the initializer of the last top-level statement.
    fn infer_last(source: &str) -> String {
        let frontend = AhoyFrontend::default();
        let (ast, errors) = frontend.parse(&frontend.tokenize(source));
        assert!(errors.is_empty(), "{errors:?}");
        let table = SymbolTable::build(&ast, WalkLimits::default());
        let last = ast.children.last().and_then(|n| n.initializer()).expect("initializer");
        infer_type(last, &table, GLOBAL_SCOPE)
    }

    #[test]
    fn test_literals() {
        assert_eq!(infer_last("x: 42"), "int");
        assert_eq!(infer_last("x: 4.2"), "float");
        assert_eq!(infer_last("x: \"s\""), "string");
        assert_eq!(infer_last("x: f\"{y}\""), "string");
        assert_eq!(infer_last("x: 'c'"), "char");
        assert_eq!(infer_last("x: false"), "bool");
        assert_eq!(infer_last("x: []"), "array");
        assert_eq!(infer_last("x: {}"), "dict");
        assert_eq!(infer_last("x: Point{x: 1}"), "Point");
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert_eq!(infer_last("x: 1 plus 2"), "int");
        assert_eq!(infer_last("x: 1 times 2.0"), "float");
        assert_eq!(infer_last("x: \"a\" plus \"b\""), UNKNOWN_TYPE);
        assert_eq!(infer_last("x: -3.5"), "float");
    }

    #[test]
    fn test_comparisons_are_bool() {
        assert_eq!(infer_last("x: 1 lesser 2"), "bool");
        assert_eq!(infer_last("x: \"a\" is \"b\""), "bool");
        assert_eq!(infer_last("x: not y"), "bool");
        assert_eq!(infer_last("x: a and b"), "bool");
    }

    #[test]
    fn test_calls_resolve_through_table() {
        assert_eq!(infer_last("func f -> string do\nreturn \"s\"\nend\nx: f||"), "string");
        assert_eq!(infer_last("func g -> int, string do\nreturn 1, \"s\"\nend\nx: g||"), UNKNOWN_TYPE);
        assert_eq!(infer_last("func h -> generic do\nend\nx: h||"), UNKNOWN_TYPE);
        assert_eq!(infer_last("x: int|\"3\"|"), "int");
        assert_eq!(infer_last("x: nothing||"), UNKNOWN_TYPE);
    }

    #[test]
    fn test_no_inference_for_access() {
        assert_eq!(infer_last("a: [1]\nx: a[0]"), UNKNOWN_TYPE);
        assert_eq!(infer_last("x: p.name"), UNKNOWN_TYPE);
        assert_eq!(infer_last("x: undefined"), UNKNOWN_TYPE);
    }

    #[test]
    fn test_judgeable() {
        assert!(is_judgeable("int"));
        assert!(!is_judgeable(UNKNOWN_TYPE));
        assert!(!is_judgeable(GENERIC_TYPE));
        assert!(!is_judgeable(""));
    }
}
