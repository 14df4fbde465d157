//! CLI module for judgr - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for batch convergence runs
//! and standalone single-transcript evaluation.

pub mod commands;

pub use commands::Cli;
