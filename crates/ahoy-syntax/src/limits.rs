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

//! Resource limits for Ahoy parsing.

/// Configurable limits for parser robustness.
///
/// Source text arrives straight from an editor buffer and can be arbitrarily
/// malformed, so nesting and input size are bounded instead of trusted.
#[derive(Debug, Clone)]
pub struct ParserLimits {
    /// Maximum nesting depth of blocks and expressions (default: 128).
    pub max_nesting_depth: usize,
    /// Maximum number of tokens parsed from one document (default: 2M).
    pub max_tokens: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_nesting_depth: 128,
            max_tokens: 2_000_000,
        }
    }
}

impl ParserLimits {
    /// Limits that never trigger. Only suitable for trusted input.
    pub fn unlimited() -> Self {
        Self {
            max_nesting_depth: usize::MAX,
            max_tokens: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_bounded() {
        let limits = ParserLimits::default();
        assert_eq!(limits.max_nesting_depth, 128);
        assert!(limits.max_tokens < usize::MAX);
    }

    #[test]
    fn test_unlimited() {
        let limits = ParserLimits::unlimited();
        assert_eq!(limits.max_nesting_depth, usize::MAX);
        assert_eq!(limits.max_tokens, usize::MAX);
    }
}
