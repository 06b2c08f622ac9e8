//! secfeed: aggregates many security RSS feeds into one ranked digest.
//!
//! The pipeline runs leaf-first:
//!
//! - [`catalog`] - the compiled-in list of feed sources
//! - [`feed`] - fetching and parsing, plus the paced fetch loop
//! - [`aggregate`] - merging duplicate items, ranking, and derived reports
//! - [`output`] - Markdown and JSON artifacts built from the ranked entries

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod feed;
pub mod output;
pub mod util;
