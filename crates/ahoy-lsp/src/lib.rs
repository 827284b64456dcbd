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

//! Ahoy Language Server Protocol (LSP) Implementation
//!
//! This crate provides the semantic-analysis and query core of a language
//! server for Ahoy, a small indentation-free scripting language with `do` /
//! `end` blocks, `::` constants and `|`-delimited call arguments.
//!
//! # Features
//!
//! - **Diagnostics**: Syntax errors plus semantic checks (program position,
//!   constant reassignment, return types, duplicate enum members, undefined
//!   functions with suggestions, argument count and type checks)
//! - **Autocomplete**: Keywords, operators, visible symbols, and member
//!   completion for strings, arrays, dicts and structs
//! - **Hover**: Symbol type and declaration line, keyword documentation
//! - **Go to Definition**: Jump to the declaration of a symbol
//! - **Document Symbols**: Flat outline of top-level declarations
//! - **Code Actions**: Quick fixes for common syntax mistakes and a few
//!   refactors
//!
//! # Robustness
//!
//! - **Atomic snapshots**: every analysis produces a new immutable
//!   [`analysis::Document`]; readers never see a half-updated one
//! - **Deadlines**: the parse pipeline and expensive requests run on the
//!   blocking pool under a timeout
//! - **Panic containment**: a panic in the parser, a diagnostic pass or a
//!   request handler is contained and reported, never fatal
//! - **Resource limits**: document size, open-document count, tree depth and
//!   fan-out, line length and diagnostic count are all capped
//!
//! # Usage
//!
//! ```bash
//! # Run the language server (stdio transport)
//! ahoy-lsp
//!
//! # With debug logging
//! RUST_LOG=ahoy_lsp=debug ahoy-lsp
//! ```
//!
//! ## Programmatic Usage
//!
//! ```no_run
//! use ahoy_lsp::AhoyLanguageServer;
//! use tower_lsp::{LspService, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let stdin = tokio::io::stdin();
//!     let stdout = tokio::io::stdout();
//!
//!     let (service, socket) = LspService::new(AhoyLanguageServer::new);
//!
//!     Server::new(stdin, stdout, socket).serve(service).await;
//! }
//! ```
//!
//! # Architecture
//!
//! - `backend`: protocol surface, delegating to the store and query modules
//! - [`document_manager`]: open-document store with versioned commits and LRU eviction
//! - [`analysis`]: the tokenize, parse, build, diagnose pipeline
//! - [`symbol_table`]: scope arena and lookups
//! - [`inference`]: best-effort expression types
//! - [`diagnostics`]: diagnostic passes and their runner
//! - [`completion`], [`hover`], [`definition`], [`symbols`], [`code_actions`]: queries
//! - [`guard`]: panic containment and deadlines

pub mod analysis;
mod backend;
pub mod builtins;
pub mod code_actions;
pub mod completion;
pub mod config;
pub mod constants;
pub mod definition;
pub mod diagnostics;
pub mod document_manager;
pub mod error;
pub mod guard;
pub mod hover;
pub mod inference;
pub mod symbol_table;
pub mod symbols;
pub mod utils;

#[cfg(test)]
mod tests;

pub use backend::AhoyLanguageServer;
pub use config::{AnalysisLimits, CodeActionLimits, ServerConfig};
pub use document_manager::{CacheStatistics, DocumentManager};
pub use error::{AnalysisFault, DocumentError};

/// LSP server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
