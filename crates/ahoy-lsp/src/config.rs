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

//! Server configuration.
//!
//! Every limit has a default taken from [`crate::constants`]. The cache and
//! document size limits can also be changed on a running server.

use crate::constants::*;
use ahoy_syntax::WalkLimits;
use std::time::Duration;

/// Bounds applied while analysing one document.
#[derive(Debug, Clone)]
pub struct AnalysisLimits {
    /// Maximum syntax tree depth walked (default: 1000).
    pub max_depth: usize,
    /// Maximum children of one node walked (default: 1000).
    pub max_children: usize,
    /// Maximum symbols returned by a full listing (default: 1000).
    pub max_listed_symbols: usize,
    /// Maximum diagnostics published per document (default: 1000).
    pub max_diagnostics: usize,
    /// Lines longer than this are not inspected by queries (default: 5000).
    pub max_line_length: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_AST_DEPTH,
            max_children: MAX_AST_CHILDREN,
            max_listed_symbols: MAX_LISTED_SYMBOLS,
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}

impl AnalysisLimits {
    pub fn walk_limits(&self) -> WalkLimits {
        WalkLimits {
            max_depth: self.max_depth,
            max_children: self.max_children,
        }
    }
}

/// Ceilings for the code action engine.
#[derive(Debug, Clone)]
pub struct CodeActionLimits {
    /// Diagnostics inspected per request (default: 5).
    pub max_diagnostics: usize,
    /// Quick fixes stop at this many actions (default: 10).
    pub quick_fix_limit: usize,
    /// Context refactors only while fewer actions exist (default: 8).
    pub context_threshold: usize,
    /// Actions returned per request (default: 15).
    pub max_actions: usize,
    /// Lines longer than this get no refactors (default: 5000).
    pub max_line_length: usize,
}

impl Default for CodeActionLimits {
    fn default() -> Self {
        Self {
            max_diagnostics: MAX_CODE_ACTION_DIAGNOSTICS,
            quick_fix_limit: QUICK_FIX_ACTION_LIMIT,
            context_threshold: CONTEXT_ACTION_THRESHOLD,
            max_actions: MAX_CODE_ACTIONS,
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of open documents kept in memory.
    pub max_cache_size: usize,
    /// Maximum document size in bytes.
    pub max_document_size: usize,
    /// Deadline for parse, symbol-table build and diagnostics.
    pub pipeline_timeout: Duration,
    /// Deadline for code actions and completion.
    pub request_timeout: Duration,
    pub analysis: AnalysisLimits,
    pub code_actions: CodeActionLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            pipeline_timeout: Duration::from_millis(PIPELINE_TIMEOUT_MS),
            request_timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            analysis: AnalysisLimits::default(),
            code_actions: CodeActionLimits::default(),
        }
    }
}
