//! Document state management and text utilities.
//!
//! This module provides:
//! - `TextRange` and the offset-accumulating split helpers
//! - `LineIndex` for efficient byte offset <-> LSP position conversion
//! - `DocumentSnapshot` and `DocumentStore` for document lifecycle management

mod state;
mod text;

pub use state::{DocumentSnapshot, DocumentStore};
pub use text::{find_outside_placeholders, split_pieces, LineIndex, Piece, TextRange};
