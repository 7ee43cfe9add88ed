//! Station blog feed: fetching, RSS parsing, and post normalization.
//!
//! - [`parser`] - streaming RSS 2.0 reader built on `quick-xml`
//! - [`normalize`] - tag/entity cleanup, excerpts, dates, fallbacks
//! - [`fetcher`] - HTTP GET with a body size cap
//!
//! # Example
//!
//! ```ignore
//! use radiox::feed::fetch_posts;
//!
//! let posts = fetch_posts(&client, "https://radioradiox.com/feed/").await?;
//! for post in &posts {
//!     println!("{} - {}", post.category, post.title);
//! }
//! ```

mod fetcher;
mod normalize;
mod parser;

pub use fetcher::{fetch_posts, parse_feed, FeedError};
pub use normalize::{clean_text, format_pub_date, make_excerpt, Post, EXCERPT_MAX_CHARS};
pub use parser::{parse_items, ParseError, RawItem};
