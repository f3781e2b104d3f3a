//! Turnstile - round-robin turn taking among threads
//!
//! A set of participants, one thread each, take turns in strict ID order by
//! passing a shared token. The token is guarded either by a mutex and
//! condition variable or by a polled mutex.

pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod runner;

pub use error::{Result, TurnstileError};
