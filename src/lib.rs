//! IR Hub, a social bookmarking service core.
//!
//! Users submit bookmarks, collect them into categories, comment on them and
//! vote on them. This library crate exposes all modules for use by the RPC
//! binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
