//! wasop - SDK and CLI companion for the Tenable Web Application Scanning v2 API
//!
//! The [`client`] module is usable on its own: build a [`client::Transport`]
//! from [`client::TransportSettings`], wrap it in a [`client::WasClient`], and
//! call the per-resource wrappers. The [`cli`] module is the binary's front end.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod output;

pub use client::WasClient;
pub use error::{Error, Result};
