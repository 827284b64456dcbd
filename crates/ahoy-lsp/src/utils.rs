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

//! Position and text helpers shared by the query services.
//!
//! LSP positions are interpreted as character offsets into a line. Symbol and
//! syntax tree positions are 1-based; every conversion to the protocol goes
//! through [`to_lsp_line`] / [`to_lsp_column`], which subtract one and clamp
//! at zero.

use crate::constants::LINE_NUMBER_OFFSET;
use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range};

/// Identifier characters: `[A-Za-z0-9_]`.
#[inline]
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Convert a 1-based line to a 0-based LSP line.
#[inline]
pub fn to_lsp_line(line: usize) -> u32 {
    clamp_u32(line.saturating_sub(LINE_NUMBER_OFFSET))
}

/// Convert a 1-based column to a 0-based LSP character.
#[inline]
pub fn to_lsp_column(column: usize) -> u32 {
    clamp_u32(column.saturating_sub(LINE_NUMBER_OFFSET))
}

#[inline]
pub fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// A single-line LSP range.
pub fn line_range(line: u32, start: u32, end: u32) -> Range {
    Range {
        start: Position { line, character: start },
        end: Position {
            line,
            character: end.max(start),
        },
    }
}

/// Text of a 0-based line without its line terminator.
pub fn line_text(rope: &Rope, line: usize) -> Option<String> {
    if line >= rope.len_lines() {
        return None;
    }
    let mut text = rope.line(line).to_string();
    while text.ends_with('\n') || text.ends_with('\r') {
        text.pop();
    }
    Some(text)
}

/// Number of characters on a 0-based line, excluding the terminator.
pub fn line_len(rope: &Rope, line: usize) -> Option<usize> {
    line_text(rope, line).map(|text| text.chars().count())
}

/// The identifier under `character` on `line`, with its character span.
///
/// The cursor may sit just past the last character of the word.
pub fn word_at(line: &str, character: usize) -> Option<(String, usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return None;
    }
    let mut pos = character.min(chars.len());
    if pos == chars.len() || !is_identifier_char(chars[pos]) {
        if pos > 0 && is_identifier_char(chars[pos - 1]) {
            pos -= 1;
        } else {
            return None;
        }
    }

    let mut start = pos;
    while start > 0 && is_identifier_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = pos;
    while end < chars.len() && is_identifier_char(chars[end]) {
        end += 1;
    }

    let word: String = chars[start..end].iter().collect();
    Some((word, start, end))
}

/// The identifier prefix ending at `character` and its start offset.
pub fn prefix_at(chars: &[char], character: usize) -> (String, usize) {
    let end = character.min(chars.len());
    let mut start = end;
    while start > 0 && is_identifier_char(chars[start - 1]) {
        start -= 1;
    }
    (chars[start..end].iter().collect(), start)
}
