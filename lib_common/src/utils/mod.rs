//! # Utilities Module
//!
//! General-purpose helpers shared across the tracker. Currently this is the
//! time toolbox: a canonical timezone-anchored clock and relative-age
//! rendering, kept separate from the domain model so it can be reused by
//! any component that needs to talk about "now".

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Timezone-anchored clock and relative-age helpers.
pub mod timetools;
