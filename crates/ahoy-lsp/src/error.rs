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

//! Error types for the analysis core.

use std::time::Duration;
use thiserror::Error;
use tower_lsp::lsp_types::Url;

/// A contained failure of analysis or request work.
///
/// Faults never reach the connection: the pipeline turns them into a
/// synthetic diagnostic and request handlers into an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisFault {
    /// The work panicked; the payload message is kept when it is a string.
    #[error("internal error: {0}")]
    Panicked(String),
    /// The work did not finish before its deadline.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    /// The worker task was cancelled before it produced a result.
    #[error("task cancelled")]
    Cancelled,
}

/// Errors from document store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document is {size} bytes, exceeding the limit of {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("document is not open: {0}")]
    NotOpen(Url),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let fault = AnalysisFault::TimedOut(Duration::from_secs(5));
        assert_eq!(fault.to_string(), "timed out after 5s");

        let err = DocumentError::TooLarge { size: 10, max: 5 };
        assert_eq!(err.to_string(), "document is 10 bytes, exceeding the limit of 5 bytes");
    }
}
