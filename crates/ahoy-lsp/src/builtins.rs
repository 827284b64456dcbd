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

//! Built-in functions and receiver methods.

/// Functions every program can call without declaring them.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "print", "ahoy", "sprintf", "len", "type", "int", "float", "string", "bool", "char", "abs", "min", "max",
    "sqrt", "floor", "ceil", "round", "random", "input", "assert", "append",
];

/// A method available on a built-in receiver type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinMethod {
    pub name: &'static str,
    pub detail: &'static str,
    /// Snippet inserted on completion.
    pub snippet: &'static str,
}

const fn method(name: &'static str, detail: &'static str, snippet: &'static str) -> BuiltinMethod {
    BuiltinMethod { name, detail, snippet }
}

pub const STRING_METHODS: &[BuiltinMethod] = &[
    method("length", "Number of characters", "length||"),
    method("upper", "Uppercase copy", "upper||"),
    method("lower", "Lowercase copy", "lower||"),
    method("replace", "Replace every occurrence", "replace|${1:old}, ${2:new}|"),
    method("contains", "True if the substring occurs", "contains|${1:substring}|"),
    method("split", "Split into an array", "split|${1:separator}|"),
    method("trim", "Strip surrounding whitespace", "trim||"),
    method("starts_with", "True if the string starts with a prefix", "starts_with|${1:prefix}|"),
    method("ends_with", "True if the string ends with a suffix", "ends_with|${1:suffix}|"),
    method("get_file", "Read the file at this path", "get_file||"),
];

pub const ARRAY_METHODS: &[BuiltinMethod] = &[
    method("length", "Number of elements", "length||"),
    method("push", "Append an element", "push|${1:value}|"),
    method("pop", "Remove and return the last element", "pop||"),
    method("sort", "Sorted copy", "sort||"),
    method("reverse", "Reversed copy", "reverse||"),
    method("map", "Apply a function to each element", "map|${1:func}|"),
    method("filter", "Keep elements matching a predicate", "filter|${1:func}|"),
    method("sum", "Sum of the elements", "sum||"),
    method("has", "True if the array contains a value", "has|${1:value}|"),
    method("shuffle", "Shuffled copy", "shuffle||"),
    method("pick", "A random element", "pick||"),
];

pub const DICT_METHODS: &[BuiltinMethod] = &[
    method("size", "Number of entries", "size||"),
    method("clear", "Remove every entry", "clear||"),
    method("has", "True if the key exists", "has|${1:key}|"),
    method("has_all", "True if every key exists", "has_all|${1:keys}|"),
    method("keys", "Array of keys", "keys||"),
    method("values", "Array of values", "values||"),
    method("sort", "Copy sorted by key", "sort||"),
    method("stable_sort", "Copy sorted by key, keeping ties in order", "stable_sort||"),
    method("merge", "Merge another dict into this one", "merge|${1:other}|"),
];

/// Method table for a receiver type name.
pub fn methods_for(ty: &str) -> Option<&'static [BuiltinMethod]> {
    match ty {
        "string" => Some(STRING_METHODS),
        "array" => Some(ARRAY_METHODS),
        "dict" => Some(DICT_METHODS),
        _ => None,
    }
}

pub fn is_builtin_function(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_tables() {
        assert!(methods_for("string").is_some_and(|m| m.iter().any(|m| m.name == "upper")));
        assert!(methods_for("array").is_some_and(|m| m.iter().any(|m| m.name == "push")));
        assert!(methods_for("dict").is_some_and(|m| m.iter().any(|m| m.name == "keys")));
        assert!(methods_for("int").is_none());
    }

    #[test]
    fn test_snippets_are_calls() {
        for table in [STRING_METHODS, ARRAY_METHODS, DICT_METHODS] {
            for m in table {
                assert!(m.snippet.starts_with(m.name), "{}", m.name);
                assert!(m.snippet.ends_with('|'), "{}", m.name);
            }
        }
    }

    #[test]
    fn test_builtin_functions() {
        assert!(is_builtin_function("print"));
        assert!(is_builtin_function("append"));
        assert!(!is_builtin_function("pritn"));
    }
}
