//! Progress events and their console rendering.

use std::collections::BTreeSet;

use url::Url;

use crate::name::PackageName;

/// Progress events emitted while a package is processed. Implementors only
/// render; the scan and aggregation results never depend on what a
/// reporter does with the events.
#[cfg_attr(test, mockall::automock)]
pub trait Reporter: Send {
    fn package_started(&mut self, package: &PackageName);
    fn package_not_found(&mut self, package: &PackageName);
    fn page_started(&mut self, page: &Url);
    fn candidate_found(&mut self, url: &Url);
    fn page_scanned(&mut self, page: &Url, candidates: usize);
    fn package_finished(&mut self, package: &PackageName, external_only: &BTreeSet<String>);
}

/// Renders progress on stdout, either as a per-link listing (verbose) or
/// as per-page counts.
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn package_started(&mut self, package: &PackageName) {
        let banner = format!("Download candidates for {}", package);
        println!();
        println!("{}", banner);
        println!("{}", "=".repeat(banner.len()));
    }

    fn package_not_found(&mut self, _package: &PackageName) {
        println!();
        println!("  Package not found");
    }

    fn page_started(&mut self, page: &Url) {
        println!();
        if self.verbose {
            let heading = format!("Candidates from {}", page);
            println!("  {}", heading);
            println!("  {}", "-".repeat(heading.len()));
        }
    }

    fn candidate_found(&mut self, url: &Url) {
        if self.verbose {
            println!("    {}", url);
        }
    }

    fn page_scanned(&mut self, page: &Url, candidates: usize) {
        if !self.verbose {
            println!("  {} candidates from {}", candidates, page);
        }
    }

    fn package_finished(&mut self, _package: &PackageName, external_only: &BTreeSet<String>) {
        println!();
        if self.verbose {
            let heading = "Versions only available externally";
            println!("  {}", heading);
            println!("  {}", "-".repeat(heading.len()));
            for version in external_only {
                println!("    {}", version);
            }
        } else {
            println!("  {} versions only available externally", external_only.len());
        }
    }
}

/// Discards every event.
pub struct NoOpReporter;

impl Reporter for NoOpReporter {
    fn package_started(&mut self, _package: &PackageName) {}
    fn package_not_found(&mut self, _package: &PackageName) {}
    fn page_started(&mut self, _page: &Url) {}
    fn candidate_found(&mut self, _url: &Url) {}
    fn page_scanned(&mut self, _page: &Url, _candidates: usize) {}
    fn package_finished(&mut self, _package: &PackageName, _external_only: &BTreeSet<String>) {}
}
