// src/crawl/link.rs
// =============================================================================
// This module decides what to do with a link we found on a page.
//
// Three questions, all answered without touching the network:
// 1. Is it crawlable? (http, https, or relative - not mailto:, tel:, ...)
// 2. Is it internal? (same host as the page it was found on, or relative)
// 3. What is its absolute URL? (qualify it against the owning page)
//
// Internal links get crawled for more links; external links are only
// checked once.
//
// Rust concepts:
// - Enums with data: an address is either absolute or relative
// - Consuming methods (self): qualifying a Link hands it over for good
// =============================================================================

use crate::error::LinkError;
use url::{ParseError, Url};

// What an href attribute turned into after parsing
//
// The url crate refuses to parse relative references without a base, so
// relative ones are kept as plain path + query until we qualify them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// Has a scheme: https://example.com/docs, mailto:me@example.com, ...
    Absolute(Url),
    /// No scheme and no host: /docs, docs/intro.html, ?page=2, #top
    Relative { path: String, query: Option<String> },
}

impl Address {
    // Parses an address found on `page`
    //
    // Protocol-relative addresses (//cdn.example.com/x) take the page's
    // scheme and become absolute. Browsers read "\" as "/" in http(s)
    // addresses, and so does Url::join, so both slashes count here.
    pub fn parse(address: &str, page: &Url) -> Result<Self, LinkError> {
        let malformed = |reason| LinkError::MalformedUrl {
            address: address.to_string(),
            reason,
        };

        match Url::parse(address) {
            Ok(url) => Ok(Address::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase) => {
                // Joining catches relative references that are broken in ways
                // a bare split would not notice (bad hosts in //host/ forms)
                let joined = page.join(address).map_err(malformed)?;
                let address = address.trim();
                if matches!(address.as_bytes(), [b'/' | b'\\', b'/' | b'\\', ..]) {
                    return Ok(Address::Absolute(joined));
                }
                Ok(split_relative(address))
            }
            Err(reason) => Err(malformed(reason)),
        }
    }

    /// Empty for relative addresses
    pub fn scheme(&self) -> &str {
        match self {
            Address::Absolute(url) => url.scheme(),
            Address::Relative { .. } => "",
        }
    }

    /// Empty for relative addresses and for schemes without a host (mailto:)
    pub fn host(&self) -> &str {
        match self {
            Address::Absolute(url) => url.host_str().unwrap_or(""),
            Address::Relative { .. } => "",
        }
    }
}

// Splits a relative reference into path and query, dropping any fragment
//
// Backslashes in the path become slashes ("\docs" is "/docs"); the query
// is left as written.
fn split_relative(address: &str) -> Address {
    let without_fragment = match address.split_once('#') {
        Some((before, _)) => before,
        None => address,
    };
    match without_fragment.split_once('?') {
        Some((path, query)) => Address::Relative {
            path: path.replace('\\', "/"),
            query: Some(query.to_string()),
        },
        None => Address::Relative {
            path: without_fragment.replace('\\', "/"),
            query: None,
        },
    }
}

// True if the address points at the owning page's host, or has no host at all
pub fn is_internal(address: &Address, page_host: &str) -> bool {
    let host = address.host();
    host.is_empty() || host == page_host
}

// True for http, https, and relative (empty scheme) addresses
pub fn is_crawlable(address: &Address) -> bool {
    matches!(address.scheme(), "http" | "https" | "")
}

// Builds an absolute URL from the page's scheme and host plus the address's path
//
// Path rules:
//   "/x"  replaces the page's path entirely
//   "x"   is appended to the page's path with exactly one "/" in between,
//         so ".../milk" and ".../milk/" both become ".../milk/x"
//   ""    keeps the page's path (links like "#top" or "?page=2")
//
// Fragments are always dropped; they never change what the server returns.
pub fn qualify(page: &Url, address: &Address) -> Url {
    let (path, query) = match address {
        Address::Absolute(url) => (url.path(), url.query()),
        Address::Relative { path, query } => (path.as_str(), query.as_deref()),
    };

    let mut qualified = page.clone();
    qualified.set_fragment(None);

    if path.is_empty() {
        // "#top" keeps the page's own query, "?page=2" replaces it
        if query.is_some() {
            qualified.set_query(query);
        }
        return qualified;
    }

    let joined = if path.starts_with('/') {
        path.to_string()
    } else if page.path().ends_with('/') {
        format!("{}{}", page.path(), path)
    } else {
        format!("{}/{}", page.path(), path)
    };
    qualified.set_path(&joined);
    qualified.set_query(query);
    qualified
}

// A link together with the page it was found on
#[derive(Debug, Clone)]
pub struct Link {
    address: Address,
    page: Url,
}

// A link that has been qualified and is ready to be fetched
#[derive(Debug, Clone)]
pub struct QualifiedLink {
    /// Absolute URL to fetch; also the dedup key
    pub url: Url,
    /// The page the link was found on (the seed for the seed itself)
    pub source: Url,
    /// Internal links are crawled, external ones only checked
    pub internal: bool,
}

impl Link {
    // The seed is its own owning page
    pub fn seed(url: Url) -> Self {
        Link {
            address: Address::Absolute(url.clone()),
            page: url,
        }
    }

    pub fn parse(address: &str, page: &Url) -> Result<Self, LinkError> {
        Ok(Link {
            address: Address::parse(address, page)?,
            page: page.clone(),
        })
    }

    pub fn is_internal(&self) -> bool {
        is_internal(&self.address, self.page.host_str().unwrap_or(""))
    }

    pub fn is_crawlable(&self) -> bool {
        is_crawlable(&self.address)
    }

    // Turns the link into something a task can fetch
    //
    // Internal links are qualified against their page; external links are
    // already absolute and only lose their fragment.
    pub fn qualify(self) -> QualifiedLink {
        let internal = self.is_internal();
        let Link { address, page } = self;
        let url = match address {
            Address::Absolute(mut url) if !internal => {
                url.set_fragment(None);
                url
            }
            address => qualify(&page, &address),
        };
        QualifiedLink {
            url,
            source: page,
            internal,
        }
    }
}
