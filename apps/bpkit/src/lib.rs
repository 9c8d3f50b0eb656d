//! # bpkit
//!
//! Command-line tool and HTTP service around `bpkit-core`.
//!
//! - `cli` → clap commands (decode, encode, inspect, edit, pack, wire, server)
//! - `api` → axum router and handlers
//! - `config` → optional `bpkit.toml`
//! - `ops` → operations shared by the CLI and the API

pub mod api;
pub mod cli;
pub mod config;
pub mod ops;
