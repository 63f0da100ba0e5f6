//! Shared utilities and common types for the weather dashboard backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Timestamp parsing and formatting for observation times
//! - Lenient numeric coercion for JSON payloads
//! - Field validators used by request schemas

pub mod time;
pub mod validation;
