//! Upload relay for IPFS pinning
//!
//! Accepts file uploads over HTTP, pins them through Pinata and returns a
//! public gateway URL. Also ships an interactive uploader that talks to the
//! relay.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod pinning;
pub mod relay;
pub mod uploader;

pub use error::{Error, Result};
