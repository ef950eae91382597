//! Core types and trait definitions for the seqdex sequence index.
//!
//! This crate is deliberately free of database dependencies. It owns the
//! domain model, the corpus and position-range math, and the two pluggable
//! collaborators: the content hasher and the suffix/LCP engine.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod corpus;
pub mod error;
pub mod hash;
pub mod reference;
pub mod sequence;
pub mod store;
pub mod suffix;

pub use error::{EngineError, Error, Result};
