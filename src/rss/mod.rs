//! Feed processing module for feedlens.
//!
//! This module handles the fetching and parsing of RSS and Atom feeds.

mod client;
mod fetcher;
mod parser;
mod types;
mod util;

pub use self::types::*;

pub use self::client::create_http_client;
pub use self::fetcher::fetch_feed_items;
pub use self::parser::parse_feed_items;
pub use self::util::{cleanup_xml, is_valid_url};
