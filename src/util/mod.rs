//! Utility functions shared by the catalog and the report renderers.
//!
//! - **URL validation**: rejects non-HTTP schemes and internal hosts for catalog URLs
//! - **Text processing**: Unicode-aware truncation and control-character stripping
//!   for feed-supplied text that ends up in Markdown

mod text;
mod url_validator;

pub use text::{collapse_whitespace, display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url, UrlValidationError};
