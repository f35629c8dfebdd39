//! Command line tracker for outreach work. It appends daily activity and post performance to a
//! JSON analytics document, merges a strategy task list into the master task list and summarizes
//! both. Every file lives under a workspace root, see [config::WorkspaceConfig].
//!

pub mod cli;
pub mod config;
pub mod fs;
pub mod store;
pub mod utils;
