//! HTTP fetch layer: the shared client, the `PageFetcher` seam, and
//! status classification for fetch failures.

mod client;
mod error;

pub use client::{ClientConfig, HttpClient, PageFetcher};
pub use error::{classify_status, is_not_found, FetchError};

#[cfg(test)]
pub use client::MockPageFetcher;
