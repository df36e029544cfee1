//! A multi-user line-based chat relay.
//!
//! Clients connect over TCP, send a display name, then exchange plain lines
//! (broadcast to everyone else) and `/`-commands (private messages, exclusion
//! broadcasts, listings). The relay keeps a concurrent registry of who is
//! online and fans lines out through per-session outbound queues.

pub mod broadcast;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod filter;
pub mod message;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;
