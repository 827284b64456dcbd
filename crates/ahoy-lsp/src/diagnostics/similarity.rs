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

//! Edit distance and "did you mean" suggestions.

use crate::constants::{SUGGESTION_LENGTH_DIVISOR, SUGGESTION_MIN_DISTANCE};

/// Levenshtein distance between two strings, counted in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Maximum distance accepted for a suggestion for `name`.
pub fn suggestion_threshold(name: &str) -> usize {
    SUGGESTION_MIN_DISTANCE.max(name.chars().count() / SUGGESTION_LENGTH_DIVISOR)
}

/// The closest candidate within the threshold, if any.
///
/// Ties go to the first candidate in iteration order.
pub fn find_similar<'a, I>(name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let threshold = suggestion_threshold(name);
    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        if candidate == name {
            continue;
        }
        let distance = levenshtein(name, candidate);
        if distance <= threshold && best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "ab"), 2);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("print", "pritn"), 2);
        assert_eq!(levenshtein("héllo", "hello"), 1);
    }

    #[test]
    fn test_threshold_scales_with_length() {
        assert_eq!(suggestion_threshold("ab"), 3);
        assert_eq!(suggestion_threshold("calculate_total"), 5);
    }

    #[test]
    fn test_find_similar() {
        let names = ["print", "printf", "sprintf", "length"];
        assert_eq!(find_similar("pritn", names), Some("print"));
        assert_eq!(find_similar("lenght", names), Some("length"));
        assert_eq!(find_similar("completely_unrelated", names), None);
        assert_eq!(find_similar("print", ["print"]), None);
    }
}
