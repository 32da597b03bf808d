//! # Jai Metro Backend
//!
//! Storage and HTTP service behind the Jai Metro chart site.
//!
//! The site publishes yearly day/night charts laid out as week rows, a daily
//! numbers record per business date, and a headline result per draw type. An
//! admin edits them through an authenticated session.
//!
//! ## Architecture
//!
//! - [`models`]: Chart, daily and result records, plus the pure week-range
//!   builder, business-day clock and cell panel codec
//! - [`services`]: Chart reconciliation and input sanitisers
//! - [`db`]: Repository pattern, storage backends and the record access services
//! - [`auth`]: Admin credentials and signed session tokens
//! - [`config`]: Server configuration from environment or TOML
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Self-healing charts
//!
//! The authoritative week layout of a year is recomputed on every chart read
//! and the stored document is reconciled against it, so documents written by an
//! older layout, or damaged by partial writes, are repaired on first access.

// RepositoryError carries its ErrorContext by value
#![allow(clippy::result_large_err)]

pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
