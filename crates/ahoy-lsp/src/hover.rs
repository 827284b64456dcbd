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

//! Hover information.
//!
//! The identifier under the cursor is resolved through the symbol table from
//! the scope enclosing the cursor line. Declared names get a kind-specific
//! markdown card; keywords and word operators fall back to a static table.
//!
//! Hovering `add` in `func add x int y int -> int do` shows:
//!
//! ````text
//! ```ahoy
//! func add x int y int -> int
//! ```
//!
//! **Function** `add`
//!
//! Returns: `int`
//!
//! Defined at line 1
//! ````

use crate::analysis::Document;
use crate::config::AnalysisLimits;
use crate::diagnostics::FunctionSignature;
use crate::symbol_table::{Symbol, SymbolKind};
use crate::utils::{line_range, word_at};
use ahoy_syntax::{walk, AstNode, NodeKind, Visit, WalkLimits};
use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

/// Get hover information for a position.
pub fn get_hover(doc: &Document, position: Position, limits: &AnalysisLimits) -> Option<Hover> {
    let line = doc.line(position.line)?;
    if line.chars().count() > limits.max_line_length {
        return None;
    }
    let (word, start, end) = word_at(&line, position.character as usize)?;

    let markdown = match doc.symbols.lookup_at(&word, position.line as usize + 1) {
        Some(symbol) => symbol_hover(doc, symbol, limits.walk_limits()),
        None => keyword_hover(&word)?.to_string(),
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: markdown,
        }),
        range: Some(line_range(position.line, start as u32, end as u32)),
    })
}

fn symbol_hover(doc: &Document, symbol: &Symbol, limits: WalkLimits) -> String {
    let name = &symbol.name;
    let ty = &symbol.ty;
    let code = match symbol.kind {
        SymbolKind::Function => doc
            .ast
            .as_ref()
            .and_then(|ast| function_at(ast, name, symbol.line, limits))
            .and_then(FunctionSignature::from_node)
            .map(|sig| sig.render())
            .unwrap_or_else(|| {
                if ty.is_empty() {
                    format!("func {name}")
                } else {
                    format!("func {name} -> {ty}")
                }
            }),
        SymbolKind::Constant => format!("{name} :: {ty}"),
        SymbolKind::Enum => format!("{name} enum"),
        SymbolKind::EnumValue if !ty.is_empty() => format!("{ty}.{name}"),
        SymbolKind::EnumValue => name.clone(),
        SymbolKind::Struct => format!("{name} struct"),
        SymbolKind::Variable | SymbolKind::Parameter | SymbolKind::StructField => format!("{name}: {ty}"),
    };
    let mut text = format!("```ahoy\n{code}\n```\n\n**{}** `{name}`\n\n", symbol.kind.label());

    if !ty.is_empty() {
        let label = match symbol.kind {
            SymbolKind::Function => Some("Returns"),
            SymbolKind::EnumValue => Some("From enum"),
            SymbolKind::Enum | SymbolKind::Struct => None,
            _ => Some("Type"),
        };
        if let Some(label) = label {
            text.push_str(&format!("{label}: `{ty}`\n\n"));
        }
    }
    text.push_str(&format!("Defined at line {}", symbol.line));
    text
}

/// The function declaration named `name` on `line`.
fn function_at<'a>(ast: &'a AstNode, name: &str, line: usize, limits: WalkLimits) -> Option<&'a AstNode> {
    let mut found = None;
    walk(ast, limits, |node, _| {
        if found.is_some() {
            return Visit::SkipChildren;
        }
        if node.kind == NodeKind::Function && node.value == name && node.line == line {
            found = Some(node);
        }
        Visit::Continue
    });
    found
}

/// Documentation for keywords, built-in types and word operators.
pub fn keyword_hover(word: &str) -> Option<&'static str> {
    let doc = match word {
        "if" => "**if** - Conditional statement\n\nSyntax: `if condition then ... end`",
        "else" => "**else** - Alternative branch\n\nSyntax: `if condition then ... else ... end`",
        "elseif" => "**elseif** - Additional condition\n\nSyntax: `if a then ... elseif b then ... end`",
        "anif" => "**anif** - Additional condition, same as `elseif`\n\nSyntax: `if a then ... anif b then ... end`",
        "then" => "**then** - Begins the body of a conditional",
        "do" => "**do** - Begins the body of a loop or function",
        "end" => "**end** - Closes a block",
        "loop" => {
            "**loop** - Loop statement\n\nSyntax:\n- `loop condition do ... end`\n- `loop i:start to end do ... end`\n- `loop i to end do ... end`\n- `loop item in array do ... end`\n- `loop key, value in dict do ... end`"
        }
        "in" => "**in** - Iterates a collection\n\nSyntax: `loop item in array do ... end`",
        "to" => "**to** - Loop range bound\n\nSyntax: `loop i:1 to 10 do ... end`",
        "func" => "**func** - Function definition\n\nSyntax: `func name p1 t1 p2 t2 -> ret do ... end`",
        "return" => "**return** - Return from a function\n\nSyntax: `return value`",
        "break" => "**break** - Exit the enclosing loop",
        "skip" => "**skip** - Continue with the next loop iteration",
        "switch" => "**switch** - Switch statement\n\nSyntax: `switch value on ... end`",
        "on" => "**on** - Introduces the cases of a switch",
        "when" => "**when** - Compile-time conditional\n\nSyntax: `when CONDITION do ... end`",
        "import" => "**import** - Import an external library\n\nSyntax: `import \"library.h\"`",
        "ahoy" => "**ahoy** - Print, shorthand for `print`\n\nSyntax: `ahoy|\"Hello!\"|`",
        "program" => "**program** - Names the program; must be the first line\n\nSyntax: `program name`",
        "is" => "**is** - Equality operator (`==`)\n\nSyntax: `if x is 5 then ... end`",
        "not" => "**not** - Logical NOT operator (`!`)",
        "and" => "**and** - Logical AND operator",
        "or" => "**or** - Logical OR operator",
        "true" => "**true** - Boolean true value",
        "false" => "**false** - Boolean false value",
        "enum" => "**enum** - Enumeration definition\n\nSyntax: `Name enum: A B C end`",
        "struct" => "**struct** - Structure definition\n\nSyntax: `Name struct: x int y int end`",
        "type" => "**type** - Type alias",
        "int" => "**int** - Integer type",
        "float" => "**float** - Floating-point type",
        "string" => "**string** - String type",
        "bool" => "**bool** - Boolean type",
        "char" => "**char** - Character type",
        "dict" => "**dict** - Dictionary type",
        "array" => "**array** - Array type",
        "plus" => "**plus** - Addition operator (`+`)\n\nSyntax: `result: a plus b`",
        "minus" => "**minus** - Subtraction operator (`-`)\n\nSyntax: `result: a minus b`",
        "times" => "**times** - Multiplication operator (`*`)\n\nSyntax: `result: a times b`",
        "div" => "**div** - Division operator (`/`)\n\nSyntax: `result: a div b`",
        "mod" => "**mod** - Modulo operator (`%`)\n\nSyntax: `result: a mod b`",
        "lesser" => "**lesser** - Less-than operator (`<`)\n\nSyntax: `if a lesser b then ... end`",
        "greater" => "**greater** - Greater-than operator (`>`)\n\nSyntax: `if a greater b then ... end`",
        _ => return None,
    };
    Some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahoy_syntax::AhoyFrontend;
    use tower_lsp::lsp_types::Url;

    fn document(source: &str) -> Document {
        Document::analyze(
            Url::parse("file:///hover.ahoy").unwrap(),
            1,
            source,
            &AhoyFrontend::default(),
            &AnalysisLimits::default(),
        )
    }

    fn hover_text(doc: &Document, line: u32, character: u32) -> Option<String> {
        let hover = get_hover(doc, Position { line, character }, &AnalysisLimits::default())?;
        match hover.contents {
            HoverContents::Markup(markup) => Some(markup.value),
            _ => None,
        }
    }

    #[test]
    fn test_function_hover_uses_signature() {
        let doc = document("func add x int y int -> int do\n  return x plus y\nend\nz: add|1, 2|");
        let text = hover_text(&doc, 3, 4).expect("hover");
        assert!(text.contains("func add x int y int -> int"), "{text}");
        assert!(text.contains("**Function** `add`"));
        assert!(text.contains("Returns: `int`"));
        assert!(text.contains("Defined at line 1"));
    }

    #[test]
    fn test_parameter_resolves_in_function_scope() {
        let doc = document("x: \"s\"\nfunc f x int do\n  y: x\nend");
        let text = hover_text(&doc, 2, 5).expect("hover");
        assert!(text.contains("**Parameter** `x`"), "{text}");
        assert!(text.contains("Type: `int`"));

        let global = hover_text(&doc, 0, 0).expect("hover");
        assert!(global.contains("**Variable** `x`"));
        assert!(global.contains("Type: `string`"));
    }

    #[test]
    fn test_constant_and_enum_value() {
        let doc = document("PI :: 3.14\nColor enum:\n  RED\nend\nc: RED");
        assert!(hover_text(&doc, 0, 1).expect("hover").contains("PI :: float"));
        let red = hover_text(&doc, 4, 4).expect("hover");
        assert!(red.contains("Color.RED"), "{red}");
        assert!(red.contains("From enum: `Color`"));
    }

    #[test]
    fn test_keyword_fallback() {
        let doc = document("if true then\n  x: 1 plus 2\nend");
        assert!(hover_text(&doc, 0, 1).expect("hover").starts_with("**if**"));
        assert!(hover_text(&doc, 1, 8).expect("hover").contains("Addition"));
    }

    #[test]
    fn test_range_covers_word() {
        let doc = document("counter: 1");
        let hover = get_hover(&doc, Position { line: 0, character: 3 }, &AnalysisLimits::default()).expect("hover");
        let range = hover.range.expect("range");
        assert_eq!((range.start.character, range.end.character), (0, 7));
    }

    #[test]
    fn test_nothing_to_show() {
        let doc = document("x: 1\n\n");
        assert!(hover_text(&doc, 1, 0).is_none());
        assert!(hover_text(&doc, 42, 0).is_none());
        assert!(hover_text(&doc, 0, 2).is_none());
    }

    #[test]
    fn test_long_lines_are_refused() {
        let doc = document(&format!("x: \"{}\"", "a".repeat(64)));
        let limits = AnalysisLimits {
            max_line_length: 10,
            ..AnalysisLimits::default()
        };
        assert!(get_hover(&doc, Position { line: 0, character: 0 }, &limits).is_none());
    }
}
