//! reelswipe: swipe through movies in the terminal.
//!
//! The binary in `main.rs` wires these modules into a TUI and a small CLI.

pub mod app;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod gesture;
pub mod preferences;
pub mod remote;
pub mod session;
pub mod social;
pub mod storage;
pub mod tmdb;
pub mod ui;
pub mod util;
pub mod validation;
