//! Stridectl library - exposes modules for testing
//!
//! v0.4.0: Config show, task and workout log editing

pub mod cli;
pub mod commands;
pub mod errors;
