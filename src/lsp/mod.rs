//! LSP protocol feature implementations.
//!
//! This module provides implementations for LSP features:
//! - Completion for endpoint URIs, Camel-K modelines and component properties
//! - Diagnostics from endpoint and component property validation
//! - Quick fixes for unknown options and invalid enum values
//! - Go-to-definition for `ref:` endpoints
//! - References between `direct`/`seda`/`vm` producers and consumers
//! - Document symbols for routes and their endpoints
//! - Hover documentation from the component and trait catalogs

mod code_action;
mod completion;
mod definition;
mod diagnostics;
mod hover;
mod references;
mod symbols;

pub use code_action::code_actions;
pub use completion::completion_at_position;
pub use definition::definition_at_position;
pub use diagnostics::{document_diagnostics, finding_message, modeline_diagnostics, to_diagnostics};
pub use hover::hover_at_position;
pub use references::references_at_position;
pub use symbols::document_symbols;
