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

//! Bounded traversal of syntax trees.
//!
//! Trees built from editor buffers are not trusted to be shallow or narrow.
//! [`walk`] uses an explicit stack, so it cannot overflow, and stops
//! descending into subtrees that exceed [`WalkLimits`].

use crate::ast::AstNode;

/// Depth and fan-out bounds for a traversal.
#[derive(Debug, Clone, Copy)]
pub struct WalkLimits {
    /// Maximum depth below the root (default: 1000).
    pub max_depth: usize,
    /// Maximum number of children of a single node (default: 1000).
    pub max_children: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_children: 1000,
        }
    }
}

/// What the visitor wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    SkipChildren,
}

/// Why a subtree was not visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    TooDeep { line: usize, depth: usize },
    TooWide { line: usize, children: usize },
}

/// Outcome of a traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub visited: usize,
    pub truncated: Vec<Truncation>,
}

impl WalkReport {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.truncated.is_empty()
    }
}

/// Visit nodes in pre-order. The visitor receives each node and its depth.
pub fn walk<'a, F>(root: &'a AstNode, limits: WalkLimits, mut visitor: F) -> WalkReport
where
    F: FnMut(&'a AstNode, usize) -> Visit,
{
    let mut report = WalkReport::default();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        if depth > limits.max_depth {
            report.truncated.push(Truncation::TooDeep {
                line: node.line,
                depth,
            });
            continue;
        }
        report.visited += 1;
        if visitor(node, depth) == Visit::SkipChildren {
            continue;
        }
        if node.children.len() > limits.max_children {
            report.truncated.push(Truncation::TooWide {
                line: node.line,
                children: node.children.len(),
            });
            continue;
        }
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }

    report
}
