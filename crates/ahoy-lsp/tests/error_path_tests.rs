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

//! Fault containment tests.
//!
//! A misbehaving frontend must never take the server down: a panic yields a
//! single analysis-fault diagnostic, a stall yields a timeout diagnostic, and
//! in both cases the document is left with an empty tree and symbol table.

use ahoy_lsp::diagnostics::codes;
use ahoy_lsp::document_manager::DocumentManager;
use ahoy_lsp::{AhoyLanguageServer, ServerConfig};
use ahoy_syntax::{AhoyFrontend, AstNode, Frontend, ParseError, Token};
use std::sync::Arc;
use std::time::Duration;
use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};

/// Panics while parsing any text that contains `boom`.
struct PanickingFrontend;

impl Frontend for PanickingFrontend {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        AhoyFrontend::default().tokenize(text)
    }

    fn parse(&self, tokens: &[Token]) -> (AstNode, Vec<ParseError>) {
        if tokens.iter().any(|t| t.text == "boom") {
            panic!("parser blew up");
        }
        AhoyFrontend::default().parse(tokens)
    }
}

/// Takes far longer than any reasonable deadline.
struct StallingFrontend(Duration);

impl Frontend for StallingFrontend {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        std::thread::sleep(self.0);
        AhoyFrontend::default().tokenize(text)
    }

    fn parse(&self, tokens: &[Token]) -> (AstNode, Vec<ParseError>) {
        AhoyFrontend::default().parse(tokens)
    }
}

fn manager_with(frontend: Arc<dyn Frontend>, pipeline_timeout: Duration) -> DocumentManager {
    let config = ServerConfig {
        pipeline_timeout,
        ..ServerConfig::default()
    };
    DocumentManager::new(&config, frontend)
}

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///{name}.ahoy")).unwrap()
}

#[tokio::test]
async fn test_parser_panic_becomes_diagnostic() {
    let manager = manager_with(Arc::new(PanickingFrontend), Duration::from_secs(5));
    let doc = manager
        .open(uri("panic"), 1, "x: 1\nboom: 2".to_string())
        .await
        .unwrap()
        .expect("published");

    assert!(doc.is_faulted());
    assert!(doc.symbols.is_empty());
    assert_eq!(doc.diagnostics.len(), 1);
    let diagnostic = &doc.diagnostics[0];
    assert_eq!(diagnostic.code(), Some(codes::ANALYSIS_FAULT));
    assert_eq!(diagnostic.line(), 1);
    assert_eq!(diagnostic.message(), "Internal parser error: parser blew up");
}

#[tokio::test]
async fn test_faulted_document_recovers_on_next_change() {
    let manager = manager_with(Arc::new(PanickingFrontend), Duration::from_secs(5));
    let uri = uri("recover");
    manager.open(uri.clone(), 1, "boom".to_string()).await.unwrap();
    assert!(manager.get(&uri).unwrap().is_faulted());

    manager.change(uri.clone(), 2, "x: 1".to_string()).await.unwrap();
    let doc = manager.get(&uri).unwrap();
    assert!(!doc.is_faulted());
    assert!(doc.symbols.lookup("x").is_some());
}

#[tokio::test]
async fn test_stalled_pipeline_times_out() {
    let frontend = Arc::new(StallingFrontend(Duration::from_millis(500)));
    let manager = manager_with(frontend, Duration::from_millis(50));
    let doc = manager
        .open(uri("slow"), 1, "PI :: 3.14".to_string())
        .await
        .unwrap()
        .expect("published");

    assert!(doc.ast.is_none());
    assert!(doc.tokens.is_empty());
    assert!(doc.symbols.lookup("PI").is_none());
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].code(), Some(codes::ANALYSIS_TIMEOUT));
    assert!(doc.diagnostics[0].message().starts_with("Analysis timed out"));
}

#[tokio::test]
async fn test_abandoned_pipeline_never_overwrites_newer_state() {
    let frontend = Arc::new(StallingFrontend(Duration::from_millis(200)));
    let manager = manager_with(frontend, Duration::from_millis(20));
    let uri = uri("abandoned");

    manager.open(uri.clone(), 1, "x: 1".to_string()).await.unwrap();
    // The stalled task for version 1 is still sleeping; wait it out.
    tokio::time::sleep(Duration::from_millis(400)).await;

    let doc = manager.get(&uri).unwrap();
    assert_eq!(doc.version, 1);
    assert!(doc.is_faulted(), "late result must not replace the published snapshot");
}

#[tokio::test]
async fn test_server_survives_faulted_documents() {
    let (service, _socket) = LspService::new(|client| {
        AhoyLanguageServer::with_frontend(client, ServerConfig::default(), Arc::new(PanickingFrontend))
    });
    let server = service.inner();
    let uri = uri("server-panic");

    server
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: "ahoy".to_string(),
                version: 1,
                text: "boom".to_string(),
            },
        })
        .await;

    let position = TextDocumentPositionParams {
        text_document: TextDocumentIdentifier { uri: uri.clone() },
        position: Position::new(0, 1),
    };
    let hover = server
        .hover(HoverParams {
            text_document_position_params: position.clone(),
            work_done_progress_params: Default::default(),
        })
        .await
        .unwrap();
    assert!(hover.is_none());

    let completion = server
        .completion(CompletionParams {
            text_document_position: position,
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        })
        .await
        .unwrap();
    assert!(completion.is_some());

    let doc = server.document(&uri).unwrap();
    assert_eq!(doc.to_lsp_diagnostics().len(), 1);
}

#[tokio::test]
async fn test_pathological_lines_are_answered_quickly() {
    let (service, _socket) = LspService::new(AhoyLanguageServer::new);
    let server = service.inner();
    let uri = uri("long-line");
    let text = format!("x: \"{}\"", "a".repeat(20_000));

    server
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: "ahoy".to_string(),
                version: 1,
                text,
            },
        })
        .await;

    let hover = server
        .hover(HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position: Position::new(0, 10_000),
            },
            work_done_progress_params: Default::default(),
        })
        .await
        .unwrap();
    assert!(hover.is_none());

    let actions = server
        .code_action(CodeActionParams {
            text_document: TextDocumentIdentifier { uri },
            range: Range::new(Position::new(0, 0), Position::new(0, 0)),
            context: CodeActionContext::default(),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        })
        .await
        .unwrap()
        .unwrap_or_default();
    assert!(actions.is_empty());
}

#[tokio::test]
async fn test_long_chains_open_and_close() {
    let manager = manager_with(Arc::new(AhoyFrontend::default()), Duration::from_secs(30));
    let sources = [
        ("operators", format!("x: 1{}\ny: 2\n", " plus 1".repeat(100_000))),
        ("members", format!("a: 1\nz: a{}\n", ".b".repeat(100_000))),
    ];
    for (name, source) in sources {
        let uri = uri(name);
        let doc = manager
            .open(uri.clone(), 1, source)
            .await
            .unwrap()
            .expect("published");

        assert!(!doc.is_faulted(), "{name}");
        assert!(
            doc.diagnostics
                .iter()
                .any(|d| d.code().is_none() && d.message().contains("nesting")),
            "{name}"
        );
        assert!(manager.close(&uri));
        drop(doc);
    }
    assert!(manager.is_empty());
}
