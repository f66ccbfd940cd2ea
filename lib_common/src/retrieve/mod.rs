//! # Data Retrieval Module
//!
//! HTTP plumbing for the tracker's external collaborators. Both outbound
//! call sites (the weather lookup and message delivery) are JSON-in or
//! JSON-out requests against services that are allowed to be flaky, so the
//! client here folds in transient-error retries and a hard per-request
//! timeout instead of leaving that to every caller.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// JSON HTTP client with retry middleware and a per-request timeout.
pub mod json_client;
