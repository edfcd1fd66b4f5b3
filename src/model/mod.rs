//! Position-indexed instance models built from route text.

mod uri;

pub use uri::{CamelUri, ComponentName, PathParam, QueryParam, UriElement};

use crate::document::TextRange;

/// Which side of an exchange an endpoint sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    Consumer,
    Producer,
}

impl EndpointRole {
    /// Whether a catalog group tag applies to this role.
    ///
    /// Groups such as `consumer (advanced)` name a single role; anything else
    /// (`common`, `advanced`, `scheduler`, no group at all) applies to both.
    pub fn accepts_group(self, group: Option<&str>) -> bool {
        let Some(group) = group else {
            return true;
        };
        let group = group.trim_start();
        match self {
            EndpointRole::Consumer => !group.starts_with("producer"),
            EndpointRole::Producer => !group.starts_with("consumer"),
        }
    }
}

/// An endpoint URI located in a document by one of the syntax extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriSite {
    /// Raw URI text as it appears in the source (no unescaping).
    pub text: String,
    /// Absolute range of `text` in the document.
    pub range: TextRange,
    /// `None` when the surrounding construct does not fix a role.
    pub role: Option<EndpointRole>,
    /// Separator between query parameters in this syntax (`&` or `&amp;`).
    pub query_separator: &'static str,
}

impl UriSite {
    pub fn new(text: impl Into<String>, start: usize, role: Option<EndpointRole>) -> Self {
        let text = text.into();
        let range = TextRange::at(start, text.len());
        Self {
            text,
            range,
            role,
            query_separator: "&",
        }
    }

    pub fn with_query_separator(mut self, separator: &'static str) -> Self {
        self.query_separator = separator;
        self
    }
}
