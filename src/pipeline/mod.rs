//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Harvest posts from the configured board and window

pub mod crawl;

pub use crawl::run_crawler;
