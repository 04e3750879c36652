//! Package index addressing.
//!
//! The index is addressed by its simple-listing root. Every per-package
//! listing URL is derived from that root and the normalized project name,
//! so `Django` and `django` land on the same page. The XML-RPC endpoint
//! used for user lookups lives at `/pypi` on the same host.

use anyhow::{Context, Result};
use url::Url;

use crate::name::PackageName;

pub mod accounts;

/// Addresses within a package index, derived from its simple-listing root.
#[derive(Debug, Clone)]
pub struct IndexUrls {
    root: Url,
    host: String,
}

impl IndexUrls {
    /// Default simple-listing root.
    pub const DEFAULT_ROOT: &'static str = "https://pypi.org/simple/";

    /// Creates index addressing from a simple-listing root URL.
    ///
    /// A missing trailing slash is added so joins extend the path instead
    /// of replacing its last segment.
    pub fn new(mut root: Url) -> Result<Self> {
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let host = root
            .host_str()
            .context("Index URL has no host")?
            .to_string();
        Ok(Self { root, host })
    }

    /// Host of the index. Links pointing anywhere else are external.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Listing page for a package, keyed by its normalized name.
    pub fn listing_url(&self, package: &PackageName) -> Result<Url> {
        self.root
            .join(&format!("{}/", package.normalized()))
            .with_context(|| format!("Failed to build listing URL for {}", package))
    }

    /// XML-RPC endpoint on the index host.
    pub fn xmlrpc_url(&self) -> Result<Url> {
        self.root
            .join("/pypi")
            .context("Failed to build XML-RPC URL")
    }
}
