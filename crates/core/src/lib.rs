//! Core business logic for yatube-rs.
//!
//! Every service wraps one or more repositories from `yatube-db` and is
//! cheap to clone, so the HTTP layer keeps one copy per service in its state.

pub mod services;

pub use services::*;
