//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Date-text interpretation (`dates`)
//! - Ordered-fallback selector resolution (`SelectorChain`)
//! - Listing page discovery (`ListingScanner`)
//! - Post detail extraction (`DetailExtractor`)
//! - Image filename derivation and download (`images`)

pub mod dates;
pub mod detail;
pub mod images;
pub mod listing;
pub mod selectors;

pub use detail::DetailExtractor;
pub use listing::{ListingScanner, PageDiscovery};
pub use selectors::SelectorChain;
