//! Foodgram - recipe sharing service
//!
//! Users publish recipes, follow authors, keep favorites and a shopping cart,
//! download an aggregated shopping list and share recipes through short links.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface (data import, admin creation)
//!
//! # Architecture
//! - `storage`: database connection, migrations and retry
//! - `services`: business logic shared by HTTP handlers and the CLI
//! - `api`: HTTP routes, handlers, auth extractors and middleware
//! - `interfaces`: command-line commands
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
