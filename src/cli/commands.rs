//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: batch convergence run over a transcript directory
//! - eval: one standalone Judge call on a single transcript

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// judgr - convergence-seeking evaluation harness for chatbot transcripts
#[derive(Parser, Debug)]
#[command(name = "judgr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the convergence loop over every transcript in a directory
    Run {
        /// Transcript directory (overrides config)
        #[arg(short, long)]
        transcripts: Option<PathBuf>,

        /// Feedback strategy for the loop
        #[arg(short, long, value_enum, default_value_t = StrategyArg::Append)]
        strategy: StrategyArg,

        /// Maximum Judge calls per transcript (overrides config)
        #[arg(short, long)]
        max_iterations: Option<u32>,
    },

    /// Evaluate one transcript with a single Judge call
    Eval {
        /// Transcript file; the bundled sample dialog when omitted
        file: Option<PathBuf>,
    },
}

/// How the prior verdict feeds back into the next Judge call
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Append prior findings to the message, keep the instruction fixed
    Append,
    /// Let the Judge rewrite the instruction itself
    Rewrite,
}
