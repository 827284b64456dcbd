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

//! Error types for Ahoy parsing.

use thiserror::Error;

/// A recoverable syntax error reported by the parser.
///
/// Positions are 1-based, as in the token stream. The parser never aborts on
/// these; it records them and resynchronises at the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    /// Line number (1-based).
    pub line: usize,
    /// Column number (1-based).
    pub column: usize,
    /// Human-readable error message.
    pub message: String,
    /// Characters covered by the offending token. Zero when the error points
    /// between tokens, such as a missing keyword.
    pub width: usize,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            width: 0,
        }
    }

    /// Set the number of characters the error covers.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Result type for fallible syntax operations.
pub type ParseResult<T> = Result<T, ParseError>;
