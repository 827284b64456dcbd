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

//! Lexer for Ahoy source text.
//!
//! The lexer never fails: characters it cannot classify become
//! [`TokenKind::Unknown`] tokens and are reported by the parser. The token
//! stream always ends with exactly one [`TokenKind::Eof`] token.

use crate::token::{is_keyword, Token, TokenKind};

/// Two-character symbols, matched before single characters.
const DOUBLE_SYMBOLS: &[&str] = &["::", "->", "==", "!=", "<=", ">="];

const SINGLE_SYMBOLS: &str = "+-*/%:|.,()[]{}<>=!";

/// Split source text into tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            let (line, column, start) = (self.line, self.column, self.pos);
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                // byte order mark
                '\u{feff}' if start == 0 => {
                    self.bump();
                }
                '?' => self.skip_comment(),
                '"' => self.quoted('"', TokenKind::String, line, column),
                '\'' => self.quoted('\'', TokenKind::Char, line, column),
                'f' if self.peek_second() == Some('"') => {
                    self.bump();
                    self.quoted('"', TokenKind::FString, line, column);
                }
                c if c.is_ascii_digit() => self.number(line, column, start),
                c if c.is_ascii_alphabetic() || c == '_' => self.word(line, column, start),
                _ => self.symbol(line, column),
            }
        }
        let (line, column) = (self.line, self.column);
        self.tokens.push(Token::new(TokenKind::Eof, "", line, column, 0));
        self.tokens
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    #[inline]
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_comment(&mut self) {
        let rest = &self.src.as_bytes()[self.pos..];
        let len = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
        // '\n' is ASCII, so `pos + len` is always a char boundary
        self.column += self.src[self.pos..self.pos + len].chars().count();
        self.pos += len;
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, line: usize, column: usize) {
        let width = self.column.saturating_sub(column);
        self.tokens.push(Token::new(kind, text, line, column, width));
    }

    fn quoted(&mut self, quote: char, kind: TokenKind, line: usize, column: usize) {
        self.bump();
        let mut text = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.bump();
                    self.push(kind, text, line, column);
                    return;
                }
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    if let Some(escaped) = self.peek().filter(|&c| c != '\n') {
                        text.push(escaped);
                        self.bump();
                    }
                }
                Some('\n') | None => {
                    self.push(TokenKind::Unknown, format!("unterminated {kind} literal"), line, column);
                    return;
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
    }

    fn number(&mut self, line: usize, column: usize, start: usize) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let mut kind = TokenKind::Integer;
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            kind = TokenKind::Float;
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = &self.src[start..self.pos];
        self.push(kind, text, line, column);
    }

    fn word(&mut self, line: usize, column: usize, start: usize) {
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        let kind = if is_keyword(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push(kind, text, line, column);
    }

    fn symbol(&mut self, line: usize, column: usize) {
        let rest = &self.src[self.pos..];
        if let Some(double) = DOUBLE_SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            self.bump();
            self.bump();
            self.push(TokenKind::Symbol, *double, line, column);
            return;
        }
        let Some(c) = self.bump() else {
            return;
        };
        let kind = if SINGLE_SYMBOLS.contains(c) {
            TokenKind::Symbol
        } else {
            TokenKind::Unknown
        };
        self.push(kind, c.to_string(), line, column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_input_yields_eof() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn test_assignment() {
        let tokens = tokenize("count: 42");
        assert_eq!(tokens[0].text, "count");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert!(tokens[1].is_symbol(":"));
        assert_eq!(tokens[2].kind, TokenKind::Integer);
        assert_eq!(tokens[2].column, 8);
    }

    #[test]
    fn test_constant_and_float() {
        assert_eq!(
            kinds("PI :: 3.14159"),
            vec![TokenKind::Identifier, TokenKind::Symbol, TokenKind::Float, TokenKind::Eof]
        );
    }

    #[test]
    fn test_leading_byte_order_mark_is_skipped() {
        assert_eq!(kinds("\u{feff}program demo"), vec![TokenKind::Keyword, TokenKind::Identifier, TokenKind::Eof]);
        assert!(kinds("x\u{feff}").contains(&TokenKind::Unknown));
    }

    #[test]
    fn test_comment_is_skipped() {
        let tokens = tokenize("? a comment\nx: 1");
        assert_eq!(tokens[0].text, "x");
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[0].column, 1);
    }

    #[test]
    fn test_string_literals() {
        let tokens = tokenize(r#"name: "ahoy" greeting: f"hi {name}" c: 'x'"#);
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "ahoy");
        assert_eq!(tokens[2].width, 6);
        assert_eq!(tokens[5].kind, TokenKind::FString);
        assert_eq!(tokens[8].kind, TokenKind::Char);
    }

    #[test]
    fn test_unterminated_string_is_unknown() {
        let tokens = tokenize("s: \"open\nx: 1");
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
        assert_eq!(tokens[3].line, 2);
    }

    #[test]
    fn test_keywords_and_word_operators() {
        let tokens = tokenize("if x is 3 then");
        assert!(tokens[0].is_keyword("if"));
        assert!(tokens[2].is_keyword("is"));
        assert!(tokens[4].is_keyword("then"));
    }

    #[test]
    fn test_double_symbols() {
        let texts: Vec<String> = tokenize("-> :: == != <= >=").into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["->", "::", "==", "!=", "<=", ">=", ""]);
    }

    #[test]
    fn test_unknown_character() {
        let tokens = tokenize("x: 1 @");
        assert_eq!(tokens[3].kind, TokenKind::Unknown);
        assert_eq!(tokens[3].text, "@");
    }

    #[test]
    fn test_multibyte_columns_count_chars() {
        let tokens = tokenize("s: \"héllo\" y");
        assert_eq!(tokens[3].text, "y");
        assert_eq!(tokens[3].column, 12);
    }
}
