//! Anthropic Admin API provider for ccteam
//!
//! This crate implements the usage source trait against the Claude Code
//! usage report endpoint, handling authentication headers and pagination.

pub mod admin_client;

pub use admin_client::AdminClient;
