//! Terminal user interface.
//!
//! - `loop_runner`: main event loop and terminal management
//! - `input`: keyboard and mouse handling
//! - `events`: background task results
//! - `helpers`: task spawning
//! - `render`: view dispatch, with one module per view

mod browse;
mod dashboard;
mod events;
mod friends;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;
mod swipe;

pub use loop_runner::{run, Action};
