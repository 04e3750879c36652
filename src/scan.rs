//! Scans one page's links for installable distributions.

use std::collections::BTreeSet;

use url::Url;

use crate::dist;
use crate::html::PageLink;
use crate::name::PackageName;
use crate::report::Reporter;

/// A distribution link and the page it was found on. The page decides
/// internal versus external when candidates are aggregated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateLink {
    pub page: Url,
    pub url: Url,
}

/// Collects every link that names an installable distribution of `package`
/// into `(page, url)` candidates. Each acceptance is surfaced through the
/// reporter, and a page summary closes the scan; the returned set is the
/// same no matter what the reporter does with the events.
pub fn scan_links(
    page: &Url,
    links: &[PageLink],
    package: &PackageName,
    reporter: &mut dyn Reporter,
) -> BTreeSet<CandidateLink> {
    reporter.page_started(page);

    let mut found = BTreeSet::new();
    for link in links {
        if dist::installable(package, &link.url) {
            reporter.candidate_found(&link.url);
            found.insert(CandidateLink {
                page: page.clone(),
                url: link.url.clone(),
            });
        }
    }

    reporter.page_scanned(page, found.len());
    found
}
