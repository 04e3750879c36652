//! Per-package crawl.
//!
//! One package means one listing page plus every page it points at through
//! a rel="download" or rel="homepage" link. Candidates found on the listing
//! and hosted by the index are internal; everything else is external. The
//! versions worth reporting are the external ones the index never serves.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::BTreeSet;
use url::Url;

use crate::dist;
use crate::html::extract_links;
use crate::http::{is_not_found, PageFetcher};
use crate::index::IndexUrls;
use crate::name::PackageName;
use crate::report::Reporter;
use crate::scan::{scan_links, CandidateLink};

/// Versions seen for one package, split by where they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageReport {
    pub internal: BTreeSet<String>,
    pub external: BTreeSet<String>,
}

impl PackageReport {
    /// Versions available only outside the index.
    pub fn external_only(&self) -> BTreeSet<String> {
        self.external.difference(&self.internal).cloned().collect()
    }
}

/// Crawls one package at a time through a `PageFetcher`.
pub struct Spider<'a, F> {
    fetcher: &'a F,
    index: &'a IndexUrls,
}

impl<'a, F: PageFetcher> Spider<'a, F> {
    pub fn new(fetcher: &'a F, index: &'a IndexUrls) -> Self {
        Self { fetcher, index }
    }

    /// Fetches the listing page and every spidered page for `package`,
    /// returning the version split, or `None` when the index has no such
    /// package. Unreachable spidered pages are skipped; an unreachable
    /// listing is an error.
    #[tracing::instrument(skip(self, reporter))]
    pub async fn process_package(
        &self,
        package: &PackageName,
        reporter: &mut dyn Reporter,
    ) -> Result<Option<PackageReport>> {
        let listing = self.index.listing_url(package)?;

        let body = match self.fetcher.fetch_page(&listing).await {
            Ok(body) => body,
            Err(err) if is_not_found(&err) => {
                warn!("Package {} not found on the index", package);
                return Ok(None);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to fetch listing page for {}", package));
            }
        };

        let links = extract_links(&body, &listing);

        // Pages worth spidering: flagged download/homepage links that do
        // not already name an installable file.
        let mut to_spider: BTreeSet<Url> = BTreeSet::new();
        for link in &links {
            if !(link.has_rel("download") || link.has_rel("homepage")) {
                continue;
            }
            if dist::installable(package, &link.url) {
                continue;
            }
            if !matches!(link.url.scheme(), "http" | "https") {
                continue;
            }
            if link.url == listing {
                continue;
            }
            to_spider.insert(link.url.clone());
        }

        let mut candidates = scan_links(&listing, &links, package, reporter);

        for target in &to_spider {
            let body = match self.fetcher.fetch_page(target).await {
                Ok(body) => body,
                Err(err) => {
                    debug!("Skipping unreachable page {}: {:#}", target, err);
                    continue;
                }
            };
            let links = extract_links(&body, target);
            candidates.extend(scan_links(target, &links, package, reporter));
        }

        Ok(Some(self.split_versions(package, &listing, &candidates)))
    }

    fn split_versions(
        &self,
        package: &PackageName,
        listing: &Url,
        candidates: &BTreeSet<CandidateLink>,
    ) -> PackageReport {
        let mut report = PackageReport::default();

        for candidate in candidates {
            let Some(version) = dist::classify(package, &candidate.url) else {
                continue;
            };
            let internal = candidate.page == *listing
                && candidate.url.host_str() == Some(self.index.host());
            if internal {
                report.internal.insert(version);
            } else {
                report.external.insert(version);
            }
        }

        report
    }
}
