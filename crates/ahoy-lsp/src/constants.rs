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

//! LSP constants and magic number definitions.
//!
//! This module centralizes the limits and protocol values used throughout the
//! server, with the rationale for each value.
//!
//! # Organization
//!
//! Constants are organized by category:
//! - **Deadlines**: time budgets for the analysis pipeline and requests
//! - **Memory Limits**: document and cache size constraints
//! - **Analysis Guards**: bounds on tree walks and result sizes
//! - **Code Actions**: ceilings for the code action engine
//! - **LSP Protocol**: protocol-specific values and defaults

// ============================================================================
// Deadlines
// ============================================================================

/// Deadline for one parse, symbol-table build and diagnostic run (in milliseconds).
///
/// **Rationale**: A well-formed file of several thousand lines analyses in a
/// few milliseconds. Anything that takes seconds is pathological input, and
/// the editor is better served by a timeout diagnostic than by waiting.
pub const PIPELINE_TIMEOUT_MS: u64 = 5_000;

/// Deadline for input-driven request work such as code actions and completion
/// (in milliseconds).
///
/// **Rationale**: Requests run while the user types. After two seconds a
/// result is no longer useful, so the request returns an empty response.
pub const REQUEST_TIMEOUT_MS: u64 = 2_000;

// ============================================================================
// Memory Limits
// ============================================================================

/// Default maximum document size in bytes (5 MB).
///
/// **Rationale**: Ahoy sources are scripts. Five megabytes is far beyond any
/// hand-written program and keeps token and tree memory bounded.
///
/// **Trade-offs**:
/// - Larger limits allow generated files but risk long analysis times
/// - Documents over the limit are rejected and keep their previous snapshot
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 5_000_000;

/// Default maximum number of simultaneously open documents (1000).
///
/// **Rationale**: Most editors keep fewer than 50 files open. With LRU
/// eviction this bounds memory without affecting normal use.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1000;

// ============================================================================
// Analysis Guards
// ============================================================================

/// Maximum syntax tree depth walked by the analysis passes.
///
/// **Rationale**: Trees come from malformed editor buffers and are not
/// trusted. Subtrees below this depth are skipped with a warning.
pub const MAX_AST_DEPTH: usize = 1000;

/// Maximum number of children of one node walked by the analysis passes.
pub const MAX_AST_CHILDREN: usize = 1000;

/// Maximum number of symbols returned by a full symbol listing.
///
/// **Rationale**: Outline views become unusable long before this size, and
/// the cap bounds response size for generated files.
pub const MAX_LISTED_SYMBOLS: usize = 1000;

/// Default maximum number of diagnostics published for one document.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 1000;

/// Lines longer than this are not inspected by completion, hover or code
/// actions.
///
/// **Rationale**: Minified or generated lines make per-character scanning
/// expensive and the results meaningless.
pub const MAX_LINE_LENGTH: usize = 5000;

/// Minimum edit distance tolerated for a "did you mean" suggestion.
pub const SUGGESTION_MIN_DISTANCE: usize = 3;

/// Longer names tolerate `len / SUGGESTION_LENGTH_DIVISOR` edits.
pub const SUGGESTION_LENGTH_DIVISOR: usize = 3;

// ============================================================================
// Code Actions
// ============================================================================

/// Maximum number of diagnostics inspected per code action request.
pub const MAX_CODE_ACTION_DIAGNOSTICS: usize = 5;

/// Quick fixes stop being generated once this many actions exist.
pub const QUICK_FIX_ACTION_LIMIT: usize = 10;

/// Context refactors are only offered while fewer actions than this exist.
pub const CONTEXT_ACTION_THRESHOLD: usize = 8;

/// Hard cap on actions returned for one request.
pub const MAX_CODE_ACTIONS: usize = 15;

// ============================================================================
// LSP Protocol Constants
// ============================================================================

/// Source tag attached to every published diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "ahoy";

/// Server name reported during initialization.
pub const SERVER_NAME: &str = "ahoy-lsp";

/// Range width used when a diagnostic's line text is not available.
///
/// **Rationale**: Editors clamp ranges to the actual line, so a modest width
/// simply underlines the start of the line.
pub const FALLBACK_RANGE_WIDTH: u32 = 20;

/// Line numbering offset for LSP positions.
///
/// **Rationale**: LSP uses 0-based line numbering, while tokens, syntax tree
/// nodes and symbols use 1-based lines. Every conversion subtracts this with
/// saturation so that a line 0 from a faulty producer clamps to 0.
///
/// **Usage**: `lsp_line = ahoy_line.saturating_sub(LINE_NUMBER_OFFSET)`
pub const LINE_NUMBER_OFFSET: usize = 1;

/// Zero-based position start index.
pub const POSITION_ZERO: u32 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasonable_deadlines() {
        assert!(REQUEST_TIMEOUT_MS < PIPELINE_TIMEOUT_MS);
        assert!(PIPELINE_TIMEOUT_MS <= 10_000, "Editor would appear hung");
    }

    #[test]
    fn test_reasonable_limits() {
        assert!(DEFAULT_MAX_CACHE_SIZE >= 100, "Cache too small for normal usage");
        assert!(DEFAULT_MAX_DOCUMENT_SIZE >= 1_000_000, "Document limit too small for real files");
        assert!(MAX_AST_DEPTH >= 100);
        assert!(MAX_AST_CHILDREN >= 100);
    }

    #[test]
    fn test_code_action_ceilings_are_ordered() {
        assert!(CONTEXT_ACTION_THRESHOLD < QUICK_FIX_ACTION_LIMIT);
        assert!(QUICK_FIX_ACTION_LIMIT < MAX_CODE_ACTIONS);
    }

    #[test]
    fn test_position_constants() {
        assert_eq!(LINE_NUMBER_OFFSET, 1, "LSP uses 0-based, parser uses 1-based");
        assert_eq!(POSITION_ZERO, 0, "LSP positions are 0-indexed");
    }
}
