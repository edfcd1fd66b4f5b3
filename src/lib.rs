//! Apache Camel Language Server implementation.

use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};
use tracing::{debug, error, info, warn};

pub mod catalog;
mod document;
pub mod error;
mod lsp;
pub mod model;
pub(crate) mod settings;
pub mod syntax;

pub use catalog::{Catalog, ComponentCatalog, RuntimeProvider, TraitCatalog};
pub use document::{DocumentSnapshot, LineIndex, TextRange};
pub use lsp::{
    code_actions, completion_at_position, definition_at_position, document_diagnostics,
    document_symbols, finding_message, hover_at_position, modeline_diagnostics,
    references_at_position, to_diagnostics,
};
pub use settings::{discover_settings, load_catalog, load_settings, read_settings, Settings};

use document::DocumentStore;

/// Initialization option naming the runtime provider.
const RUNTIME_PROVIDER_OPTION: &str = "runtimeProvider";

/// Run a request computation, turning a panic into the empty result.
fn guarded<T: Default>(request: &'static str, compute: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(compute)) {
        Ok(value) => value,
        Err(_) => {
            error!(request, "request handler panicked, returning empty result");
            T::default()
        }
    }
}

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    catalog: OnceLock<Arc<Catalog>>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            catalog: OnceLock::new(),
        }
    }

    /// The catalog chosen at initialization, or an empty one before that.
    fn catalog(&self) -> Arc<Catalog> {
        self.catalog.get().cloned().unwrap_or_default()
    }

    /// Store the new snapshot and publish diagnostics.
    async fn on_document_change(&self, uri: Url, text: String, version: i32) {
        let snapshot = self.documents.open(uri.clone(), text, version);
        let catalog = self.catalog();
        let diagnostics = guarded("diagnostics", || {
            lsp::document_diagnostics(&snapshot, &catalog)
        });
        debug!(%uri, version, count = diagnostics.len(), "publishing diagnostics");

        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }
}

fn load_workspace_catalog(workspace_root: Option<&Path>) -> Catalog {
    let loaded = match workspace_root {
        Some(root) => {
            let (settings, settings_dir) = settings::discover_settings(root);
            settings::load_catalog(&settings, &settings_dir)
        }
        None => Catalog::builtin(),
    };
    loaded.unwrap_or_else(|e| {
        error!(error = %e, "failed to load the built-in catalog");
        Catalog::default()
    })
}

fn runtime_override(options: Option<&serde_json::Value>) -> Option<RuntimeProvider> {
    let name = options?.get(RUNTIME_PROVIDER_OPTION)?.as_str()?;
    match name.parse() {
        Ok(runtime) => Some(runtime),
        Err(e) => {
            warn!(error = %e, "ignoring runtime provider initialization option");
            None
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        let mut catalog = load_workspace_catalog(workspace_root.as_deref());
        if let Some(runtime) = runtime_override(params.initialization_options.as_ref()) {
            catalog.runtime = runtime;
        }
        info!(
            components = catalog.components.len(),
            runtime = %catalog.runtime,
            "catalog ready"
        );
        let _ = self.catalog.set(Arc::new(catalog));

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(
                        [":", "?", "&", "=", "."].map(String::from).to_vec(),
                    ),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Camel language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.on_document_change(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        )
        .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We use FULL sync, so there's exactly one change with the full text
        if let Some(change) = params.content_changes.into_iter().next() {
            self.on_document_change(
                params.text_document.uri,
                change.text,
                params.text_document.version,
            )
            .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri);
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };
        let catalog = self.catalog();
        Ok(guarded("hover", || {
            lsp::hover_at_position(&doc, &catalog, position)
        }))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(doc) = self.documents.get(uri) else {
            debug!(%uri, "completion requested for unknown document");
            return Ok(None);
        };
        let catalog = self.catalog();
        let result = guarded("completion", || {
            lsp::completion_at_position(&doc, &catalog, position)
        });
        let items = match &result {
            Some(CompletionResponse::Array(items)) => items.len(),
            _ => 0,
        };
        debug!(
            %uri,
            line = position.line,
            character = position.character,
            items,
            "completion"
        );
        Ok(result)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };
        let catalog = self.catalog();
        let location = guarded("definition", || {
            lsp::definition_at_position(&doc, &catalog.components, position)
        });
        Ok(location.map(GotoDefinitionResponse::Scalar))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };
        let catalog = self.catalog();
        let open = self.documents.all();
        let locations = guarded("references", || {
            lsp::references_at_position(
                &doc,
                open.iter().map(|d| d.as_ref()),
                &catalog.components,
                position,
            )
        });
        debug!(%uri, count = locations.len(), "references");
        Ok(Some(locations))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let Some(doc) = self.documents.get(&params.text_document.uri) else {
            return Ok(None);
        };
        Ok(guarded("documentSymbol", || lsp::document_symbols(&doc)))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let Some(doc) = self.documents.get(&params.text_document.uri) else {
            return Ok(None);
        };
        let catalog = self.catalog();
        let actions = guarded("codeAction", || {
            lsp::code_actions(&doc, &catalog, &params.context.diagnostics)
        });
        if actions.is_empty() {
            return Ok(None);
        }
        Ok(Some(actions))
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::new(Backend::new)
}
