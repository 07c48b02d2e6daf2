// src/checker/html.rs
// =============================================================================
// This module pulls attribute values out of HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Is built on html5ever (Mozilla's HTML parser)
// - Never rejects input: broken markup still becomes a tree
//
// Unlike a CSS selector query, we walk the tree ourselves so the tag and
// attribute names can be anything the caller asks for.
//
// Rust concepts:
// - Iterators: descendants() walks the tree in document order
// - Send: scraper's tree is not Send, so we only build it inside a
//   synchronous function and never hold it across an .await
// =============================================================================

use scraper::Html;

// A fetched page, kept as its raw body until someone asks for attributes
#[derive(Debug, Clone)]
pub struct Document {
    body: String,
}

impl Document {
    pub fn new(body: String) -> Self {
        Document { body }
    }

    /// Values of `attr_name` on every `tag_name` element, in document order
    pub fn attribute_values(&self, tag_name: &str, attr_name: &str) -> Vec<String> {
        extract_tag_attribute(&self.body, tag_name, attr_name)
    }
}

// Extracts an attribute's value from every element with the given tag name
//
// Parameters:
//   html: the HTML content to parse
//   tag_name: element to look for, e.g. "a"
//   attr_name: attribute to read, e.g. "href"
//
// Returns: the values in document order, duplicates included
//
// Example:
//   html = "<a href='/docs'>Docs</a><a>no href</a><a href='/docs'>Again</a>"
//   result = ["/docs", "/docs"]
pub fn extract_tag_attribute(html: &str, tag_name: &str, attr_name: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .filter(|element| element.name() == tag_name)
        .filter_map(|element| element.attr(attr_name))
        .map(str::to_string)
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does descendants() return?
//    - The node itself, then every node below it, depth-first
//    - Depth-first from the root is exactly the order things appear in
//      the HTML source
//
// 2. Why filter_map?
//    - It filters and maps in one step: None is dropped, Some(x) becomes x
//    - as_element() is None for text and comment nodes
// -----------------------------------------------------------------------------
