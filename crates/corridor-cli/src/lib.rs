//! # corridor-cli
//!
//! Thin wrappers around the routing and reliability core. The core itself
//! (`corridor-engine`) never touches a terminal or a config file directly —
//! this crate loads configuration, wires up LLM clients, and prints results.
//!
//! ## Commands
//!
//! - `corridor run` — run one request through the failover engine
//! - `corridor explain` — summarize a session's routing decisions
//! - `corridor timeline` — print a session's (or the global) event log
//! - `corridor validate-config` — check configuration for cross-file errors

pub mod clients;
pub mod commands;

pub use commands::Cli;
