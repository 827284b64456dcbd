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

//! Diagnostic types.

use crate::constants::DIAGNOSTIC_SOURCE;
use crate::utils::{clamp_u32, line_range, to_lsp_line};
use std::fmt;
use tower_lsp::lsp_types::{self, DiagnosticSeverity, NumberOrString};

/// Stable diagnostic codes, matched by the code action engine.
pub mod codes {
    pub const PROGRAM_POSITION: &str = "program-position";
    pub const CONST_REASSIGNMENT: &str = "const-reassignment";
    pub const CONST_REDECLARATION: &str = "const-redeclaration";
    pub const RETURN_TYPE_MISMATCH: &str = "return-type-mismatch";
    pub const MISSING_RETURN: &str = "missing-return";
    pub const VOID_RETURN_VALUE: &str = "void-return-value";
    pub const ENUM_DUPLICATE_MEMBER: &str = "enum-duplicate-member";
    pub const UNDEFINED_FUNCTION: &str = "undefined-function";
    pub const ARGUMENT_COUNT: &str = "argument-count";
    pub const ARGUMENT_TYPE_MISMATCH: &str = "argument-type-mismatch";
    pub const TYPE_MISMATCH: &str = "type-mismatch";
    pub const ANALYSIS_TIMEOUT: &str = "analysis-timeout";
    pub const ANALYSIS_FAULT: &str = "analysis-fault";
    pub const TOO_MANY_DIAGNOSTICS: &str = "too-many-diagnostics";
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational hint
    Hint,
    /// Warning - might be an issue
    Warning,
    /// Error - definitely an issue
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hint => write!(f, "hint"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl From<Severity> for DiagnosticSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Hint => DiagnosticSeverity::HINT,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Error => DiagnosticSeverity::ERROR,
        }
    }
}

/// A positioned problem report.
///
/// The line is 1-based like the syntax tree; columns are 0-based character
/// offsets into that line. Conversion to the protocol happens in
/// [`Diagnostic::to_lsp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<&'static str>,
    message: String,
    line: usize,
    start_column: usize,
    end_column: usize,
}

impl Diagnostic {
    fn new(severity: Severity, code: Option<&'static str>, message: impl Into<String>, line: usize) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            line,
            start_column: 0,
            end_column: 0,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>, line: usize) -> Self {
        Self::new(Severity::Error, Some(code), message, line)
    }

    pub fn warning(code: &'static str, message: impl Into<String>, line: usize) -> Self {
        Self::new(Severity::Warning, Some(code), message, line)
    }

    /// A syntax error reported by the parser; carries no code.
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::new(Severity::Error, None, message, line)
    }

    /// Set the 0-based character span on the line.
    pub fn with_columns(mut self, start: usize, end: usize) -> Self {
        self.start_column = start;
        self.end_column = end.max(start);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<&'static str> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Line number (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn columns(&self) -> (usize, usize) {
        (self.start_column, self.end_column)
    }

    /// Convert to a protocol diagnostic.
    pub fn to_lsp(&self) -> lsp_types::Diagnostic {
        lsp_types::Diagnostic {
            range: line_range(
                to_lsp_line(self.line),
                clamp_u32(self.start_column),
                clamp_u32(self.end_column),
            ),
            severity: Some(self.severity.into()),
            code: self.code.map(|c| NumberOrString::String(c.to_string())),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: self.message.clone(),
            ..Default::default()
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}] at line {}: {}", self.severity, code, self.line, self.message),
            None => write!(f, "{} at line {}: {}", self.severity, self.line, self.message),
        }
    }
}
