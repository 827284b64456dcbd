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

//! Token types produced by the lexer.

use std::fmt;

/// Reserved words of the language.
///
/// Type names (`int`, `string`, ...) are deliberately not reserved: they are
/// also callable as conversion functions.
pub const KEYWORDS: &[&str] = &[
    "program", "import", "func", "return", "if", "then", "else", "elseif", "anif", "end",
    "loop", "do", "in", "to", "break", "skip", "enum", "struct", "true", "false", "and", "or",
    "not", "is", "plus", "minus", "times", "div", "mod", "lesser", "greater", "switch", "on",
    "when",
];

/// Built-in type names recognised in parameter and field positions.
pub const TYPE_NAMES: &[&str] = &[
    "int", "float", "string", "char", "bool", "dict", "array", "vector2", "color", "generic",
    "any", "void",
];

/// Returns true if `word` is a reserved keyword.
#[inline]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Returns true if `word` can name a type: a built-in type or a capitalised
/// user type such as `Point`.
pub fn is_type_name(word: &str) -> bool {
    TYPE_NAMES.contains(&word) || word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// The lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    Identifier,
    Keyword,
    Integer,
    Float,
    /// `"text"`; the token text excludes the quotes.
    String,
    /// `f"text {expr}"`; the token text excludes the prefix and quotes.
    FString,
    /// `'c'`; the token text excludes the quotes.
    Char,
    /// Operators and punctuation.
    Symbol,
    /// A character the lexer does not understand, or an unterminated literal.
    Unknown,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "identifier",
            Self::Keyword => "keyword",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::FString => "f-string",
            Self::Char => "char",
            Self::Symbol => "symbol",
            Self::Unknown => "unknown",
            Self::Eof => "end of file",
        };
        f.write_str(name)
    }
}

/// A single token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Line number (1-based).
    pub line: usize,
    /// Column of the first character (1-based, in characters).
    pub column: usize,
    /// Width of the token in the source, in characters.
    pub width: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize, width: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            width,
        }
    }

    /// Column just past the last character of the token (1-based).
    #[inline]
    pub fn end_column(&self) -> usize {
        self.column + self.width
    }

    #[inline]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    #[inline]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert!(is_keyword("func"));
        assert!(is_keyword("anif"));
        assert!(!is_keyword("int"));
        assert!(!is_keyword("print"));
    }

    #[test]
    fn test_type_names() {
        assert!(is_type_name("int"));
        assert!(is_type_name("generic"));
        assert!(is_type_name("Point"));
        assert!(!is_type_name("y"));
        assert!(!is_type_name(""));
    }

    #[test]
    fn test_end_column() {
        let token = Token::new(TokenKind::Identifier, "count", 2, 5, 5);
        assert_eq!(token.end_column(), 10);
    }
}
