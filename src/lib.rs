//! # Quire
//!
//! Polls a content provider, resolves every listed article into a typed,
//! validated [`Item`](domain::Item) and prints it.
//!
//! ## Architecture
//!
//! ```text
//! Catalog → CycleRunner → ItemResolver → { Fetcher, MediaIndexCell, SectionMapper } → Item
//! ```
//!
//! - [`fetcher`]: one HTTP GET, one JSON body
//! - [`resolver`]: detail fetch, section mapping, media joins
//! - [`cycle`]: concurrent resolution of a whole catalog
//! - [`daemon`]: fixed-delay polling loop
//!
//! ## Quick Start
//!
//! ```bash
//! # Poll every five minutes
//! quire run --delay 5m
//!
//! # One pass over the catalog
//! quire once
//!
//! # A single article
//! quire show <id>
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// the item resolver and the configuration.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/quire/config.toml`, supporting:
/// - Provider base URL and request timeout
/// - Time separators per endpoint
/// - Section failure policy
/// - Polling interval and worker count
pub mod config;

/// Command-line interface using clap.
///
/// - `run [--delay <interval>]` - Poll forever
/// - `once` - Run a single cycle
/// - `show <id>` - Resolve one item
pub mod cli;

/// One polling cycle: catalog fetch and concurrent item resolution.
pub mod cycle;

/// Fixed-delay polling loop with graceful shutdown.
pub mod daemon;

/// Core domain models.
///
/// - [`Item`](domain::Item): a resolved article
/// - [`Section`](domain::Section): typed content blocks
/// - [`parse_instant`](domain::parse_instant): provider date-time codec
pub mod domain;

/// JSON fetching over HTTP.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for single-request retrieval
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Item resolution pipeline.
///
/// - [`ItemResolver`](resolver::ItemResolver): detail payload to [`Item`](domain::Item)
/// - [`SectionMapper`](resolver::SectionMapper): raw section to typed [`Section`](domain::Section)
/// - [`MediaIndexCell`](resolver::MediaIndexCell): per-item, fetch-once media index
pub mod resolver;
