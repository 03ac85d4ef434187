//! User-facing interfaces other than HTTP

#[cfg(feature = "cli")]
pub mod cli;
