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

//! Lexer, parser and syntax tree for the Ahoy language.
//!
//! This crate turns source text into a token stream and an untyped syntax
//! tree. It is the front end consumed by `ahoy-lsp`, which only relies on the
//! [`Frontend`] boundary:
//!
//! - [`Frontend::tokenize`] never fails; unknown characters become
//!   [`TokenKind::Unknown`] tokens.
//! - [`Frontend::parse`] never fails as a whole; it returns the best tree it
//!   could build together with every [`ParseError`] it recovered from.
//!
//! # Example
//!
//! ```
//! use ahoy_syntax::{AhoyFrontend, Frontend, NodeKind};
//!
//! let frontend = AhoyFrontend::default();
//! let tokens = frontend.tokenize("func add x int y int -> int do return x plus y end");
//! let (ast, errors) = frontend.parse(&tokens);
//!
//! assert!(errors.is_empty());
//! assert_eq!(ast.children[0].kind, NodeKind::Function);
//! ```
//!
//! # Robustness
//!
//! Input comes from editor buffers and is routinely incomplete. Nesting depth
//! and token counts are bounded by [`ParserLimits`], and [`walk`] gives
//! consumers a traversal that is bounded in depth and fan-out without
//! recursion.

mod ast;
mod error;
mod lexer;
mod limits;
mod parser;
mod token;
pub mod visit;

pub use ast::{AstNode, NodeKind};
pub use error::{ParseError, ParseResult};
pub use lexer::tokenize;
pub use limits::ParserLimits;
pub use parser::{parse, parse_with_limits};
pub use token::{is_keyword, is_type_name, Token, TokenKind, KEYWORDS, TYPE_NAMES};
pub use visit::{walk, Truncation, Visit, WalkLimits, WalkReport};

/// The boundary between source text and semantic analysis.
///
/// Implementations must be shareable across worker threads. Callers treat a
/// panic escaping either method as a recoverable fault.
pub trait Frontend: Send + Sync {
    /// Split source text into tokens.
    fn tokenize(&self, text: &str) -> Vec<Token>;

    /// Build a syntax tree from tokens, returning every recovered error.
    fn parse(&self, tokens: &[Token]) -> (AstNode, Vec<ParseError>);
}

/// The Ahoy lexer and parser.
#[derive(Debug, Clone, Default)]
pub struct AhoyFrontend {
    limits: ParserLimits,
}

impl AhoyFrontend {
    pub fn with_limits(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Frontend for AhoyFrontend {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text)
    }

    fn parse(&self, tokens: &[Token]) -> (AstNode, Vec<ParseError>) {
        parse_with_limits(tokens, &self.limits)
    }
}
