// src/checker/mod.rs
// =============================================================================
// This module contains everything that touches a page's bytes.
//
// Submodules:
// - http: Fetches pages and checks link status over HTTP
// - html: Extracts attribute values (like <a href>) from HTML pages
//
// The crawl module decides WHAT to fetch; this module knows HOW.
// =============================================================================

mod html;
mod http;

// Re-export public items from submodules
// This lets users write `checker::HttpGateway` instead of
// `checker::http::HttpGateway`
pub use html::{extract_tag_attribute, Document};
pub use http::{Gateway, HttpGateway, StatusCheck};
