//! # cfimages-core
//!
//! Core types and utilities for the Cloudflare Images client.
//!
//! This crate provides the foundational pieces shared by Images API
//! integrations: error handling, client configuration, the uniform response
//! envelope, and the compact identifier codec.
//!
//! ## Modules
//!
//! - [`error`] - Error types and error-code mapping
//! - [`config`] - Configuration for client instances
//! - [`envelope`] - The `{result, success, errors, messages}` response contract
//! - [`id`] - Compact UUID encoding and custom-identifier validation

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod id;

// Re-export commonly used types
pub use error::{Error, Result};
