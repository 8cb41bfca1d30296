//! Core types and shared functionality for wikicard.
//!
//! This crate provides:
//! - Unified error types
//! - Layered configuration
//! - The locale provider trait and the built-in English table
//! - The read-only site registry snapshot

pub mod config;
pub mod error;
pub mod locale;
pub mod sites;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use locale::{EnglishLocale, Gender, Locale};
pub use sites::{Site, SiteRegistry, SiteSnapshot};
