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

//! Semantic diagnostics.
//!
//! [`DiagnosticRunner`] drives a list of [`DiagnosticPass`]es over a parsed
//! document. Passes only read the tree and the symbol table, so they are free
//! to run in any order; the runner keeps their output in a fixed order.

mod diagnostic;
mod rules;
mod runner;
mod signature;
mod similarity;

pub use diagnostic::{codes, Diagnostic, Severity};
pub use rules::{
    default_passes, types_compatible, ArgumentCount, ArgumentTypes, CheckContext, ConstantCollisions,
    DeclaredTypes, DiagnosticPass, EnumDuplicates, ProgramPosition, ReturnTypes, UndefinedFunctions,
};
pub use runner::DiagnosticRunner;
pub use signature::{collect_signatures, FunctionSignature, Parameter};
pub use similarity::{find_similar, levenshtein, suggestion_threshold};
