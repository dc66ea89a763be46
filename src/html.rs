//! The HTML parse/serialize boundary.
//!
//! [`HtmlEngine`] is the only place a concrete HTML library shows up. The rest
//! of the crate sees [`Document`]s. The production engine, [`Html5Engine`],
//! parses with `scraper` (html5ever underneath), which recovers from malformed
//! markup the way browsers do, and then copies the result into a [`Document`].
//!
//! Parsing is tolerant: html5ever never rejects input, it records errors and
//! repairs the tree. The only hard failure is input that is not UTF-8 text.

use crate::dom::{Document, Element, NodeKind};
use scraper::{Html, Node};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("markup produced no usable node: {0:?}")]
    Empty(String),
    #[error("markup has more than one top-level node: {0:?}")]
    MultipleRoots(String),
}

/// Parser/serializer used by the captioning pipeline.
///
/// `Sync` so a single engine can be shared by the parallel file driver.
pub trait HtmlEngine: Sync {
    /// Parse a complete HTML document.
    fn parse_document(&self, text: &str) -> Result<Document, ParseError>;

    /// Parse an HTML fragment (body context). The fragment's top-level nodes
    /// become children of the returned document's root.
    fn parse_fragment(&self, text: &str) -> Result<Document, ParseError>;

    /// Serialize a document back to text.
    fn serialize(&self, document: &Document) -> String {
        document.to_html()
    }

    /// Decode raw file content and parse it as a document.
    fn parse_bytes(&self, bytes: &[u8]) -> Result<Document, ParseError> {
        let text = std::str::from_utf8(bytes)?;
        self.parse_document(text)
    }
}

/// html5ever-backed engine (via `scraper`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5Engine;

impl HtmlEngine for Html5Engine {
    fn parse_document(&self, text: &str) -> Result<Document, ParseError> {
        Ok(convert(&Html::parse_document(text), false))
    }

    fn parse_fragment(&self, text: &str) -> Result<Document, ParseError> {
        Ok(convert(&Html::parse_fragment(text), true))
    }
}

/// Copy a parsed scraper tree into a [`Document`].
///
/// html5ever wraps fragment content in a synthetic `<html>` element; for
/// fragments that wrapper is dropped and its children hang off the root.
fn convert(html: &Html, fragment: bool) -> Document {
    let mut doc = Document::new();
    let source_root = html.tree.root();
    let mut ids = HashMap::new();
    ids.insert(source_root.id(), doc.root());

    // Pre-order, so a node's parent is always mapped before the node itself.
    for node in source_root.descendants().skip(1) {
        let Some(parent) = node.parent() else {
            continue;
        };
        let Some(&target) = ids.get(&parent.id()) else {
            continue;
        };
        let kind = match node.value() {
            Node::Element(e) if fragment && parent.id() == source_root.id() && e.name() == "html" => {
                ids.insert(node.id(), target);
                continue;
            }
            Node::Element(e) => {
                let mut element = Element::new(e.name());
                // Namespaced attributes (`xlink:href`, `xmlns:xlink`) keep
                // their prefix; `attrs()` would only give the local name.
                for (name, value) in e.attrs.iter() {
                    let qualified = match &name.prefix {
                        Some(prefix) => format!("{}:{}", &**prefix, &*name.local),
                        None => name.local.to_string(),
                    };
                    element.set_attr(qualified, &**value);
                }
                NodeKind::Element(element)
            }
            Node::Text(text) => NodeKind::Text((**text).to_owned()),
            Node::Comment(comment) => NodeKind::Comment((**comment).to_owned()),
            Node::Doctype(doctype) => NodeKind::Doctype {
                name: doctype.name().to_owned(),
                public_id: doctype.public_id().to_owned(),
                system_id: doctype.system_id().to_owned(),
            },
            _ => continue,
        };
        let id = doc.append(target, kind);
        ids.insert(node.id(), id);
    }

    doc
}
