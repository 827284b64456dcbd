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

//! LSP backend implementation.
//!
//! The backend translates protocol messages into document store operations
//! and query calls. It owns no document state itself: every request fetches
//! the current snapshot from the [`DocumentManager`] and works against that
//! `Arc` without holding any lock.
//!
//! # Fault Containment
//!
//! Hover, definition and document symbols run inside a panic boundary. A
//! caught panic becomes a JSON-RPC internal error for that one request and the
//! connection stays up. Completion and code actions run on the blocking pool
//! under the request deadline; a missed deadline or a fault there gives the
//! client an empty response rather than an error.

use crate::analysis::Document;
use crate::code_actions::get_code_actions;
use crate::completion::get_completions;
use crate::config::ServerConfig;
use crate::constants::SERVER_NAME;
use crate::definition::get_definition;
use crate::document_manager::{CacheStatistics, DocumentManager};
use crate::error::{AnalysisFault, DocumentError};
use crate::guard::{contain_async, run_with_deadline};
use crate::hover::get_hover;
use crate::symbols::extract_symbols;
use ahoy_syntax::{AhoyFrontend, Frontend};
use std::future::Future;
use std::sync::Arc;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

/// Ahoy Language Server backend.
pub struct AhoyLanguageServer {
    /// LSP client connection.
    client: Client,
    /// Store of open documents, shared with the pipeline tasks.
    document_manager: Arc<DocumentManager>,
    config: ServerConfig,
}

impl AhoyLanguageServer {
    /// Create a new language server with default configuration.
    ///
    /// Default settings:
    /// - Max cache size: 1000 documents
    /// - Max document size: 5 MB
    /// - Pipeline deadline: 5 s, request deadline: 2 s
    pub fn new(client: Client) -> Self {
        Self::with_config(client, ServerConfig::default())
    }

    /// Create a new language server with custom configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ahoy_lsp::{AhoyLanguageServer, ServerConfig};
    /// use tower_lsp::Client;
    ///
    /// fn create_server(client: Client) -> AhoyLanguageServer {
    ///     let config = ServerConfig {
    ///         max_cache_size: 200,
    ///         max_document_size: 1024 * 1024,
    ///         ..ServerConfig::default()
    ///     };
    ///     AhoyLanguageServer::with_config(client, config)
    /// }
    /// ```
    pub fn with_config(client: Client, config: ServerConfig) -> Self {
        Self::with_frontend(client, config, Arc::new(AhoyFrontend::default()))
    }

    /// Create a server that tokenizes and parses through `frontend`.
    pub fn with_frontend(client: Client, config: ServerConfig, frontend: Arc<dyn Frontend>) -> Self {
        Self {
            client,
            document_manager: Arc::new(DocumentManager::new(&config, frontend)),
            config,
        }
    }

    /// Get current cache statistics.
    pub fn cache_statistics(&self) -> CacheStatistics {
        self.document_manager.statistics()
    }

    /// Update maximum cache size (can be called during runtime).
    pub fn set_max_cache_size(&self, new_max: usize) {
        self.document_manager.set_max_cache_size(new_max);
    }

    /// Get current maximum cache size.
    pub fn max_cache_size(&self) -> usize {
        self.document_manager.max_cache_size()
    }

    /// Update maximum document size (can be called during runtime).
    pub fn set_max_document_size(&self, new_max: usize) {
        self.document_manager.set_max_document_size(new_max);
    }

    /// Get current maximum document size.
    pub fn max_document_size(&self) -> usize {
        self.document_manager.max_document_size()
    }

    /// The published snapshot of an open document.
    pub fn document(&self, uri: &Url) -> Option<Arc<Document>> {
        self.document_manager.get(uri)
    }

    async fn publish(&self, document: &Document) {
        let diagnostics = document.to_lsp_diagnostics();
        debug!(
            uri = %document.uri,
            version = document.version,
            count = diagnostics.len(),
            "publishing diagnostics"
        );
        self.client
            .publish_diagnostics(document.uri.clone(), diagnostics, Some(document.version))
            .await;
    }

    /// Publish the outcome of an open or change.
    async fn settle(&self, uri: &Url, outcome: std::result::Result<Option<Arc<Document>>, DocumentError>) {
        match outcome {
            Ok(Some(document)) => self.publish(&document).await,
            Ok(None) => debug!(%uri, "analysis superseded, nothing published"),
            Err(err @ DocumentError::TooLarge { .. }) => {
                error!(%uri, %err, "document rejected");
                self.client
                    .show_message(MessageType::ERROR, format!("Ahoy: {uri} was not analysed: {err}"))
                    .await;
            }
            Err(err @ DocumentError::NotOpen(_)) => warn!(%err, "change ignored"),
        }
    }

    /// Run a cheap query inside the panic boundary.
    async fn guarded<T, Fut>(&self, method: &'static str, future: Fut) -> Result<T>
    where
        Fut: Future<Output = T>,
    {
        contain_async(future).await.map_err(|fault| {
            error!(method, %fault, "request handler failed");
            Error::internal_error()
        })
    }

    /// Run an input-driven query on the blocking pool under the request
    /// deadline. A deadline miss or a fault yields `T::default()`.
    async fn time_boxed<T, F>(&self, method: &'static str, work: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        match run_with_deadline(self.config.request_timeout, work).await {
            Ok(value) => value,
            Err(fault @ AnalysisFault::Panicked(_)) => {
                error!(method, %fault, "request handler panicked, returning empty result");
                T::default()
            }
            Err(fault) => {
                warn!(method, %fault, "request abandoned, returning empty result");
                T::default()
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for AhoyLanguageServer {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        info!("Ahoy Language Server initializing");

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        will_save: None,
                        will_save_wait_until: None,
                        save: None,
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string(), ":".to_string(), " ".to_string()]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Options(CodeActionOptions {
                    code_action_kinds: Some(vec![CodeActionKind::QUICKFIX, CodeActionKind::REFACTOR]),
                    work_done_progress_options: Default::default(),
                    resolve_provider: Some(false),
                })),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(crate::VERSION.to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        info!("Ahoy Language Server initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Ahoy Language Server shutting down");
        self.document_manager.clear();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem { uri, version, text, .. } = params.text_document;
        info!(%uri, version, bytes = text.len(), "document opened");

        let outcome = self.document_manager.open(uri.clone(), version, text).await;
        self.settle(&uri, outcome).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let VersionedTextDocumentIdentifier { uri, version } = params.text_document;

        let Some(change) = params.content_changes.into_iter().last() else {
            warn!(%uri, "change event had no content changes");
            return;
        };
        debug!(%uri, version, bytes = change.text.len(), "document changed");

        let outcome = self.document_manager.change(uri.clone(), version, change.text).await;
        self.settle(&uri, outcome).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        debug!(uri = %params.text_document.uri, "document saved");
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(%uri, "document closed");
        self.document_manager.close(&uri);
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        debug!(%uri, line = position.line, character = position.character, "completion request");

        let Some(document) = self.document_manager.get(uri) else {
            debug!(%uri, "no completion available (document not open)");
            return Ok(None);
        };

        let limits = self.config.analysis.clone();
        let items = self
            .time_boxed("textDocument/completion", move || {
                get_completions(&document, position, &limits)
            })
            .await;
        debug!(%uri, count = items.len(), "completion items");
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        self.guarded("textDocument/hover", async {
            let document = self.document_manager.get(uri)?;
            get_hover(&document, position, &self.config.analysis)
        })
        .await
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        self.guarded("textDocument/definition", async {
            let document = self.document_manager.get(uri)?;
            get_definition(&document, position, &self.config.analysis).map(GotoDefinitionResponse::Scalar)
        })
        .await
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;

        self.guarded("textDocument/documentSymbol", async {
            let document = self.document_manager.get(uri)?;
            Some(DocumentSymbolResponse::Nested(extract_symbols(&document, &self.config.analysis)))
        })
        .await
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = &params.text_document.uri;
        debug!(
            %uri,
            line = params.range.start.line,
            diagnostics = params.context.diagnostics.len(),
            "code action request"
        );

        let Some(document) = self.document_manager.get(uri) else {
            return Ok(None);
        };

        let limits = self.config.code_actions.clone();
        let range = params.range;
        let diagnostics = params.context.diagnostics;
        let actions = self
            .time_boxed("textDocument/codeAction", move || {
                get_code_actions(&document, range, &diagnostics, &limits)
            })
            .await;
        Ok(Some(actions))
    }
}
