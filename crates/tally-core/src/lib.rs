//! Core types and trait definitions for Tally, a survey collection and
//! analytics service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The storage backend implements [`store::SurveyStore`]; the HTTP layer
//! drives the facades in [`analytics`] and [`submission`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod analytics;
pub mod error;
pub mod identity;
pub mod response;
pub mod store;
pub mod submission;
pub mod survey;
pub mod user;

pub use error::{Error, Result};
