//! # Stock Domain Module
//!
//! Everything the tracker knows about the garden stock feed itself: the
//! wire model for incoming snapshots, display formatting for items and
//! quantities, and the last-seen index that remembers when an item was last
//! observed purchasable.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Display formatting for quantities and item lines.
pub mod format;
/// Last positive-quantity observation per item, per category.
pub mod lastseen;
/// Wire types and tick construction for the upstream feed.
pub mod model;
