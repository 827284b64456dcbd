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

//! Recursive-descent parser for Ahoy.
//!
//! Parsing never fails as a whole. Each statement is parsed with
//! [`ParseResult`]; a statement-level error is recorded and the parser skips
//! to the next line. Missing block keywords (`do`, `then`, `end`) are
//! recorded without skipping, so the rest of the block still parses.
//!
//! Errors for a missing keyword are anchored just past the previous token,
//! which is where the keyword belongs.

use std::collections::HashSet;

use crate::ast::{AstNode, NodeKind};
use crate::error::{ParseError, ParseResult};
use crate::limits::ParserLimits;
use crate::token::{is_type_name, Token, TokenKind};

const BLOCK_END: &[&str] = &["end"];
const BRANCH_END: &[&str] = &["end", "else", "elseif", "anif"];

const EQUALITY_OPS: &[&str] = &["is", "==", "!="];
const COMPARISON_OPS: &[&str] = &["<", ">", "<=", ">=", "lesser", "greater"];
const ADDITIVE_OPS: &[&str] = &["+", "-", "plus", "minus"];
const MULTIPLICATIVE_OPS: &[&str] = &["*", "/", "%", "times", "div", "mod"];

/// Parse a token stream with default limits.
pub fn parse(tokens: &[Token]) -> (AstNode, Vec<ParseError>) {
    parse_with_limits(tokens, &ParserLimits::default())
}

/// Parse a token stream with explicit limits.
pub fn parse_with_limits(tokens: &[Token], limits: &ParserLimits) -> (AstNode, Vec<ParseError>) {
    let mut errors = Vec::new();
    let tokens = if tokens.len() > limits.max_tokens {
        errors.push(ParseError::new(
            1,
            1,
            format!(
                "document has {} tokens, exceeding the limit of {}",
                tokens.len(),
                limits.max_tokens
            ),
        ));
        &tokens[..limits.max_tokens]
    } else {
        tokens
    };

    let mut parser = Parser::new(tokens, limits);
    parser.errors = errors;
    let program = parser.program();
    (program, parser.errors)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    /// Number of open `|...|` argument lists.
    call_depth: usize,
    /// `(position, call_depth)` pairs where a nested call did not parse.
    rejected_calls: HashSet<(usize, usize)>,
    limits: &'t ParserLimits,
    errors: Vec<ParseError>,
    eof: Token,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], limits: &'t ParserLimits) -> Self {
        let (line, column) = tokens
            .last()
            .map(|t| (t.line, t.end_column()))
            .unwrap_or((1, 1));
        Self {
            tokens,
            pos: 0,
            depth: 0,
            call_depth: 0,
            rejected_calls: HashSet::new(),
            limits,
            errors: Vec::new(),
            eof: Token::new(TokenKind::Eof, "", line, column, 0),
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    #[inline]
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .filter(|t| !t.is_eof())
            .unwrap_or(&self.eof)
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// True when the next token continues the line of the previous token.
    fn on_same_line(&self) -> bool {
        match self.previous() {
            Some(prev) => !self.at_eof() && self.peek().line == prev.line,
            None => false,
        }
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.peek().is_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_any_keyword(&self, keywords: &[&str]) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Keyword && keywords.contains(&token.text.as_str())
    }

    fn expect_identifier(&mut self, what: &str) -> ParseResult<Token> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> ParseResult<Token> {
        if self.peek().is_symbol(symbol) {
            Ok(self.advance())
        } else {
            Err(self.missing(&format!("'{symbol}'")))
        }
    }

    // ------------------------------------------------------------------
    // Error helpers
    // ------------------------------------------------------------------

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        let found = match token.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Unknown => token.text.clone(),
            _ => format!("'{}'", token.text),
        };
        ParseError::new(token.line, token.column, format!("expected {expected}, found {found}")).with_width(token.width)
    }

    /// Error for a missing token, anchored just past the previous token.
    fn missing(&self, expected: &str) -> ParseError {
        let (line, column) = match self.previous() {
            Some(prev) => (prev.line, prev.end_column()),
            None => (self.peek().line, self.peek().column),
        };
        ParseError::new(line, column, format!("expected {expected}"))
    }

    /// Record a missing keyword and keep parsing.
    fn expect_keyword_soft(&mut self, keyword: &str, context: &str) {
        if !self.eat_keyword(keyword) {
            let err = self.missing(&format!("'{keyword}' {context}"));
            self.errors.push(err);
        }
    }

    /// Consume the closing `end` of a block, recording its line on `node`.
    fn expect_end(&mut self, node: &mut AstNode, opener: &str) {
        if self.peek().is_keyword("end") {
            let end = self.advance();
            node.end_line = node.end_line.max(end.line);
        } else {
            let err = self.missing(&format!("'end' to close '{opener}'"));
            node.end_line = node.end_line.max(err.line);
            self.errors.push(err);
        }
    }

    /// Skip the rest of the line an error was reported on.
    fn synchronize(&mut self, line: usize, start: usize) {
        while !self.at_eof() && self.peek().line <= line {
            self.advance();
        }
        if self.pos == start {
            self.advance();
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.deepen()?;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Take one level of the nesting budget. Callers restore `depth`.
    fn deepen(&mut self) -> ParseResult<()> {
        if self.depth >= self.limits.max_nesting_depth {
            let token = self.peek();
            return Err(ParseError::new(
                token.line,
                token.column,
                format!("nesting exceeds the limit of {}", self.limits.max_nesting_depth),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn program(&mut self) -> AstNode {
        let mut root = AstNode::new(NodeKind::Program, "", 1, 1);
        while !self.at_eof() {
            let start = self.pos;
            match self.statement() {
                Ok(node) => root.push(node),
                Err(err) => {
                    let line = err.line;
                    self.errors.push(err);
                    self.synchronize(line, start);
                }
            }
        }
        root.end_line = root.end_line.max(self.eof.line);
        root
    }

    /// Parse statements until one of `terminators` (not consumed) or EOF.
    fn block(&mut self, terminators: &[&str]) -> AstNode {
        let token = self.peek();
        let mut block = AstNode::new(NodeKind::Block, "", token.line, token.column);
        while !self.at_eof() && !self.at_any_keyword(terminators) {
            let start = self.pos;
            match self.statement() {
                Ok(node) => block.push(node),
                Err(err) => {
                    let line = err.line;
                    self.errors.push(err);
                    self.synchronize(line, start);
                }
            }
        }
        block
    }

    fn statement(&mut self) -> ParseResult<AstNode> {
        self.nested(|p| p.statement_inner())
    }

    fn statement_inner(&mut self) -> ParseResult<AstNode> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Keyword => match token.text.as_str() {
                "program" => self.program_declaration(),
                "import" => self.import(),
                "func" => self.function(),
                "if" => self.if_statement(),
                "loop" => self.loop_statement(),
                "return" => self.return_statement(),
                "break" => {
                    self.advance();
                    Ok(AstNode::new(NodeKind::Break, "", token.line, token.column))
                }
                "skip" => {
                    self.advance();
                    Ok(AstNode::new(NodeKind::Skip, "", token.line, token.column))
                }
                "true" | "false" | "not" => self.expression_statement(),
                _ => Err(self.unexpected("a statement")),
            },
            TokenKind::Identifier => self.identifier_statement(),
            TokenKind::Unknown | TokenKind::Symbol if !token.is_symbol("[") && !token.is_symbol("{") => {
                Err(self.unexpected("a statement"))
            }
            _ => self.expression_statement(),
        }
    }

    fn program_declaration(&mut self) -> ParseResult<AstNode> {
        let keyword = self.advance();
        let name = self.expect_identifier("a program name")?;
        Ok(AstNode::new(NodeKind::ProgramDeclaration, name.text, keyword.line, keyword.column))
    }

    fn import(&mut self) -> ParseResult<AstNode> {
        let keyword = self.advance();
        if self.peek().kind != TokenKind::String {
            return Err(self.unexpected("an import path"));
        }
        let path = self.advance();
        Ok(AstNode::new(NodeKind::Import, path.text, keyword.line, keyword.column))
    }

    fn identifier_statement(&mut self) -> ParseResult<AstNode> {
        let name = self.peek().clone();
        let next = self.peek_at(1).clone();
        let after = self.peek_at(2).clone();

        if next.is_symbol(":") {
            self.advance();
            self.advance();
            let value = self.expression()?;
            return Ok(AstNode::new(NodeKind::Assignment, name.text, name.line, name.column)
                .with_children(vec![value]));
        }
        if next.is_symbol("::") {
            self.advance();
            self.advance();
            let value = self.expression()?;
            return Ok(
                AstNode::new(NodeKind::ConstantDeclaration, name.text, name.line, name.column)
                    .with_children(vec![value]),
            );
        }
        if next.kind == TokenKind::Identifier && next.line == name.line {
            if after.is_symbol(":") || after.is_symbol("::") {
                let kind = if after.is_symbol("::") {
                    NodeKind::ConstantDeclaration
                } else {
                    NodeKind::VariableDeclaration
                };
                self.advance();
                self.advance();
                self.advance();
                let value = self.expression()?;
                return Ok(AstNode::new(kind, name.text, name.line, name.column)
                    .with_type(next.text)
                    .with_children(vec![value]));
            }
        }
        if next.is_keyword("enum") {
            return self.enum_declaration();
        }
        if next.is_keyword("struct") {
            return self.struct_declaration();
        }

        let expr = self.expression()?;
        if self.peek().is_symbol(":") && matches!(expr.kind, NodeKind::MemberAccess | NodeKind::IndexAccess) {
            self.advance();
            let value = self.expression()?;
            let (line, column) = (expr.line, expr.column);
            return Ok(AstNode::new(NodeKind::Assignment, "", line, column).with_children(vec![expr, value]));
        }
        if expr.kind == NodeKind::Identifier
            && self.on_same_line()
            && !self.at_any_keyword(BRANCH_END)
        {
            return Err(self.missing("':' after variable name"));
        }
        Ok(expr)
    }

    fn expression_statement(&mut self) -> ParseResult<AstNode> {
        self.expression()
    }

    fn function(&mut self) -> ParseResult<AstNode> {
        let keyword = self.advance();
        let name = self.expect_identifier("a function name")?;

        let mut params = AstNode::new(NodeKind::Parameters, "", keyword.line, keyword.column);
        while self.peek().kind == TokenKind::Identifier && self.peek().line == keyword.line {
            let param_name = self.advance();
            let mut param = AstNode::new(NodeKind::Parameter, param_name.text, param_name.line, param_name.column);
            let candidate = self.peek();
            if candidate.kind == TokenKind::Identifier && candidate.line == keyword.line && is_type_name(&candidate.text) {
                let ty = self.advance();
                param.declared_type = ty.text;
            }
            if self.eat_symbol("=") {
                let default = self.expression()?;
                param.push(default);
            }
            params.push(param);
            self.eat_symbol(",");
        }

        let mut return_types = Vec::new();
        if self.eat_symbol("->") {
            loop {
                let ty = self.expect_identifier("a return type")?;
                return_types.push(ty.text);
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }

        self.expect_keyword_soft("do", "after function signature");
        let body = self.block(BLOCK_END);
        let mut node = AstNode::new(NodeKind::Function, name.text, keyword.line, keyword.column)
            .with_type(return_types.join(", "))
            .with_children(vec![params, body]);
        self.expect_end(&mut node, "func");
        Ok(node)
    }

    fn if_statement(&mut self) -> ParseResult<AstNode> {
        let keyword = self.advance();
        let condition = self.expression()?;
        if !self.eat_keyword("do") {
            self.expect_keyword_soft("then", "after condition");
        }
        let then_block = self.block(BRANCH_END);
        let mut node = AstNode::new(NodeKind::If, "", keyword.line, keyword.column)
            .with_children(vec![condition, then_block]);

        if self.at_any_keyword(&["elseif", "anif"]) {
            let branch = self.nested(|p| p.if_statement())?;
            node.push(branch);
        } else if self.eat_keyword("else") {
            let else_block = self.block(BLOCK_END);
            node.push(else_block);
            self.expect_end(&mut node, "if");
        } else {
            self.expect_end(&mut node, "if");
        }
        Ok(node)
    }

    fn loop_statement(&mut self) -> ParseResult<AstNode> {
        let keyword = self.advance();
        let (line, column) = (keyword.line, keyword.column);
        let first = self.peek().clone();
        let second = self.peek_at(1).clone();

        let mut node = if first.is_keyword("do") {
            AstNode::new(NodeKind::WhileLoop, "", line, column)
        } else if first.kind == TokenKind::Identifier && second.is_symbol(":") {
            // loop i:start to end
            self.advance();
            self.advance();
            let start = self.expression()?;
            let counter = AstNode::new(NodeKind::Assignment, first.text, first.line, first.column)
                .with_children(vec![start]);
            if !self.eat_keyword("to") {
                return Err(self.missing("'to' in range loop"));
            }
            let end = self.expression()?;
            AstNode::new(NodeKind::ForRangeLoop, "", line, column).with_children(vec![counter, end])
        } else if first.kind == TokenKind::Identifier && second.is_symbol(",") {
            // loop key, value in dict
            self.advance();
            self.advance();
            let value = self.expect_identifier("a value variable")?;
            if !self.eat_keyword("in") {
                return Err(self.missing("'in' in dict loop"));
            }
            let iterable = self.expression()?;
            AstNode::new(NodeKind::ForInDictLoop, "", line, column).with_children(vec![
                AstNode::new(NodeKind::Identifier, first.text, first.line, first.column),
                AstNode::new(NodeKind::Identifier, value.text, value.line, value.column),
                iterable,
            ])
        } else if first.kind == TokenKind::Identifier && (second.is_keyword("in") || second.is_keyword("to")) {
            self.advance();
            let kind = if self.advance().text == "in" {
                NodeKind::ForInArrayLoop
            } else {
                NodeKind::ForCountLoop
            };
            let target = self.expression()?;
            AstNode::new(kind, "", line, column).with_children(vec![
                AstNode::new(NodeKind::Identifier, first.text, first.line, first.column),
                target,
            ])
        } else {
            let condition = self.expression()?;
            AstNode::new(NodeKind::WhileLoop, "", line, column).with_children(vec![condition])
        };

        self.expect_keyword_soft("do", "to start loop body");
        let body = self.block(BLOCK_END);
        node.push(body);
        self.expect_end(&mut node, "loop");
        Ok(node)
    }

    fn return_statement(&mut self) -> ParseResult<AstNode> {
        let keyword = self.advance();
        let mut node = AstNode::new(NodeKind::Return, "", keyword.line, keyword.column);
        if self.on_same_line() && !self.at_any_keyword(BRANCH_END) {
            loop {
                let value = self.expression()?;
                node.push(value);
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }
        Ok(node)
    }

    fn enum_declaration(&mut self) -> ParseResult<AstNode> {
        let name = self.advance();
        self.advance();
        self.eat_symbol(":");
        let mut node = AstNode::new(NodeKind::EnumDeclaration, name.text, name.line, name.column);
        while !self.at_eof() && !self.peek().is_keyword("end") {
            let token = self.advance();
            match token.kind {
                TokenKind::Identifier => {
                    node.push(AstNode::new(NodeKind::Identifier, token.text, token.line, token.column));
                }
                TokenKind::Symbol if token.text == "," => {}
                _ => self.errors.push(ParseError::new(
                    token.line,
                    token.column,
                    format!("expected an enum member, found '{}'", token.text),
                )
                .with_width(token.width)),
            }
        }
        self.expect_end(&mut node, "enum");
        Ok(node)
    }

    fn struct_declaration(&mut self) -> ParseResult<AstNode> {
        let name = self.advance();
        self.advance();
        self.eat_symbol(":");
        let mut node = AstNode::new(NodeKind::StructDeclaration, name.text, name.line, name.column);
        while !self.at_eof() && !self.peek().is_keyword("end") {
            let token = self.advance();
            match token.kind {
                TokenKind::Identifier => {
                    let mut field = AstNode::new(NodeKind::StructField, token.text, token.line, token.column);
                    let candidate = self.peek();
                    if candidate.kind == TokenKind::Identifier
                        && candidate.line == token.line
                        && is_type_name(&candidate.text)
                    {
                        field.declared_type = self.advance().text;
                    }
                    node.push(field);
                }
                TokenKind::Symbol if token.text == "," => {}
                _ => self.errors.push(ParseError::new(
                    token.line,
                    token.column,
                    format!("expected a struct field, found '{}'", token.text),
                )
                .with_width(token.width)),
            }
        }
        self.expect_end(&mut node, "struct");
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(&mut self) -> ParseResult<AstNode> {
        self.nested(|p| p.or_expression())
    }

    fn binary_level(
        &mut self,
        operators: &[&str],
        next: fn(&mut Self) -> ParseResult<AstNode>,
    ) -> ParseResult<AstNode> {
        let lhs = next(self)?;
        let depth = self.depth;
        let result = self.binary_chain(lhs, operators, next);
        self.depth = depth;
        result
    }

    /// Fold `lhs op rhs op rhs ...` to the left. Every link deepens the tree,
    /// so each one is charged against the nesting limit.
    fn binary_chain(
        &mut self,
        mut lhs: AstNode,
        operators: &[&str],
        next: fn(&mut Self) -> ParseResult<AstNode>,
    ) -> ParseResult<AstNode> {
        loop {
            let token = self.peek();
            let is_operator = matches!(token.kind, TokenKind::Keyword | TokenKind::Symbol)
                && operators.contains(&token.text.as_str());
            if !is_operator {
                return Ok(lhs);
            }
            self.deepen()?;
            let op = self.advance();
            let rhs = next(self)?;
            lhs = AstNode::new(NodeKind::BinaryOp, op.text, lhs.line, lhs.column).with_children(vec![lhs, rhs]);
        }
    }

    fn or_expression(&mut self) -> ParseResult<AstNode> {
        self.binary_level(&["or"], Self::and_expression)
    }

    fn and_expression(&mut self) -> ParseResult<AstNode> {
        self.binary_level(&["and"], Self::equality)
    }

    fn equality(&mut self) -> ParseResult<AstNode> {
        self.binary_level(EQUALITY_OPS, Self::comparison)
    }

    fn comparison(&mut self) -> ParseResult<AstNode> {
        self.binary_level(COMPARISON_OPS, Self::additive)
    }

    fn additive(&mut self) -> ParseResult<AstNode> {
        self.binary_level(ADDITIVE_OPS, Self::multiplicative)
    }

    fn multiplicative(&mut self) -> ParseResult<AstNode> {
        self.binary_level(MULTIPLICATIVE_OPS, Self::unary)
    }

    fn unary(&mut self) -> ParseResult<AstNode> {
        let token = self.peek();
        if token.is_keyword("not") || token.is_symbol("-") || token.is_symbol("!") {
            let op = self.advance();
            let operand = self.nested(|p| p.unary())?;
            return Ok(AstNode::new(NodeKind::UnaryOp, op.text, op.line, op.column).with_children(vec![operand]));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> ParseResult<AstNode> {
        let expr = self.primary()?;
        let depth = self.depth;
        let result = self.postfix_chain(expr);
        self.depth = depth;
        result
    }

    fn postfix_chain(&mut self, mut expr: AstNode) -> ParseResult<AstNode> {
        loop {
            if self.peek().is_symbol(".") {
                self.deepen()?;
                self.advance();
                let member = self.expect_identifier("a member name after '.'")?;
                if let Some(call_args) = self.call_after_name()? {
                    let mut args = vec![expr];
                    args.extend(call_args);
                    expr = AstNode::new(NodeKind::MethodCall, member.text, member.line, member.column)
                        .with_children(args);
                } else {
                    expr = AstNode::new(NodeKind::MemberAccess, member.text, member.line, member.column)
                        .with_children(vec![expr]);
                }
            } else if self.peek().is_symbol("[") && self.on_same_line() {
                self.deepen()?;
                self.advance();
                let index = self.expression()?;
                self.expect_symbol("]")?;
                let (line, column) = (expr.line, expr.column);
                expr = AstNode::new(NodeKind::IndexAccess, "", line, column).with_children(vec![expr, index]);
            } else {
                return Ok(expr);
            }
        }
    }

    /// Arguments of a call whose `|` follows a name, or `None` when the bar
    /// does not open one.
    ///
    /// Outside an argument list a same-line `|` always opens a call. Inside
    /// one, the bar may close the enclosing list instead (`print|x|`), so a
    /// nested call is kept only when it closes on its own line and the
    /// enclosing list still has tokens on that line to close with.
    fn call_after_name(&mut self) -> ParseResult<Option<Vec<AstNode>>> {
        if !self.peek().is_symbol("|") || !self.on_same_line() {
            return Ok(None);
        }
        if self.call_depth == 0 {
            return self.call_arguments().map(Some);
        }
        let key = (self.pos, self.call_depth);
        if self.rejected_calls.contains(&key) {
            return Ok(None);
        }
        let (pos, error_count) = (self.pos, self.errors.len());
        let line = self.peek().line;
        if let Ok(args) = self.call_arguments() {
            let closed_on_line = self.previous().is_some_and(|t| t.line == line);
            if closed_on_line && !self.at_eof() && self.peek().line == line {
                return Ok(Some(args));
            }
        }
        self.pos = pos;
        self.errors.truncate(error_count);
        self.rejected_calls.insert(key);
        Ok(None)
    }

    /// Parse `|a, b|`, starting at the opening bar.
    fn call_arguments(&mut self) -> ParseResult<Vec<AstNode>> {
        self.expect_symbol("|")?;
        if self.eat_symbol("|") {
            return Ok(Vec::new());
        }
        self.call_depth += 1;
        let args = self.argument_list();
        self.call_depth -= 1;
        let args = args?;
        self.expect_symbol("|")?;
        Ok(args)
    }

    fn argument_list(&mut self) -> ParseResult<Vec<AstNode>> {
        let mut args = Vec::new();
        loop {
            args.push(self.expression()?);
            if !self.eat_symbol(",") {
                return Ok(args);
            }
        }
    }

    fn primary(&mut self) -> ParseResult<AstNode> {
        let token = self.peek().clone();
        let (line, column) = (token.line, token.column);
        match token.kind {
            TokenKind::Integer | TokenKind::Float => {
                self.advance();
                Ok(AstNode::new(NodeKind::Number, token.text, line, column))
            }
            TokenKind::String => {
                self.advance();
                Ok(AstNode::new(NodeKind::String, token.text, line, column))
            }
            TokenKind::FString => {
                self.advance();
                Ok(AstNode::new(NodeKind::FString, token.text, line, column))
            }
            TokenKind::Char => {
                self.advance();
                Ok(AstNode::new(NodeKind::Char, token.text, line, column))
            }
            TokenKind::Keyword if token.text == "true" || token.text == "false" => {
                self.advance();
                Ok(AstNode::new(NodeKind::Boolean, token.text, line, column))
            }
            TokenKind::Identifier => {
                self.advance();
                if let Some(args) = self.call_after_name()? {
                    return Ok(AstNode::new(NodeKind::Call, token.text, line, column).with_children(args));
                }
                if self.peek().is_symbol("{") && self.on_same_line() && is_type_name(&token.text) {
                    return self.struct_literal(token);
                }
                Ok(AstNode::new(NodeKind::Identifier, token.text, line, column))
            }
            TokenKind::Symbol if token.text == "(" => {
                self.advance();
                let inner = self.expression()?;
                self.expect_symbol(")")?;
                Ok(inner)
            }
            TokenKind::Symbol if token.text == "[" => {
                self.advance();
                let mut node = AstNode::new(NodeKind::ArrayLiteral, "", line, column);
                while !self.peek().is_symbol("]") {
                    if self.at_eof() {
                        return Err(self.missing("']' to close array"));
                    }
                    let element = self.expression()?;
                    node.push(element);
                    if !self.eat_symbol(",") {
                        break;
                    }
                }
                let close = self.expect_symbol("]")?;
                node.end_line = node.end_line.max(close.line);
                Ok(node)
            }
            TokenKind::Symbol if token.text == "{" => {
                self.advance();
                let mut node = AstNode::new(NodeKind::DictLiteral, "", line, column);
                while !self.peek().is_symbol("}") {
                    if self.at_eof() {
                        return Err(self.missing("'}' to close dict"));
                    }
                    let key = self.expression()?;
                    self.expect_symbol(":")?;
                    let value = self.expression()?;
                    let (key_line, key_column) = (key.line, key.column);
                    node.push(
                        AstNode::new(NodeKind::DictEntry, "", key_line, key_column).with_children(vec![key, value]),
                    );
                    if !self.eat_symbol(",") {
                        break;
                    }
                }
                let close = self.expect_symbol("}")?;
                node.end_line = node.end_line.max(close.line);
                Ok(node)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Parse `Name{field: value, ...}` after the name.
    fn struct_literal(&mut self, name: Token) -> ParseResult<AstNode> {
        self.advance();
        let mut node = AstNode::new(NodeKind::StructLiteral, name.text, name.line, name.column);
        while !self.peek().is_symbol("}") {
            let field = self.expect_identifier("a field name")?;
            self.expect_symbol(":")?;
            let value = self.expression()?;
            node.push(AstNode::new(NodeKind::DictEntry, field.text, field.line, field.column).with_children(vec![value]));
            if !self.eat_symbol(",") {
                break;
            }
        }
        let close = self.expect_symbol("}")?;
        node.end_line = node.end_line.max(close.line);
        Ok(node)
    }
}
