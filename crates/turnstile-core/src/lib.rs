//! Core types and services for the Turnstile check-in desk.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the attendee directory, the code generator, the grant/deny decision, and
//! the bounded access log. Persistence is injected through
//! [`blob::BlobStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access_log;
pub mod blob;
pub mod codec;
pub mod directory;
pub mod engine;
pub mod error;
pub mod log;
pub mod person;
pub mod scanner;

pub use error::{Error, Result};
