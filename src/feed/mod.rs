//! Getting items out of remote feeds.
//!
//! - [`parser`] - RSS 2.0 decoding with an Atom/RDF fallback via `feed-rs`
//! - [`fetcher`] - one HTTP GET per source, size and time limited
//! - [`orchestrator`] - the paced, sequential loop over the catalog
//!
//! # Example
//!
//! ```ignore
//! use secfeed::feed::{Aggregator, HttpFetcher, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
//!
//! let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)?;
//! let state = Aggregator::new(fetcher, delay).run(&catalog, &ctx).await;
//! ```

pub mod fetcher;
pub mod orchestrator;
pub mod parser;

pub use fetcher::{FeedFetcher, FetchError, HttpFetcher, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use orchestrator::{Aggregator, FetchProgress, RunState, DEFAULT_REQUEST_DELAY};
pub use parser::{parse_feed, ParseError, ParsedFeed, RawItem};
