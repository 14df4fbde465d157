//! Batch driver - runs the convergence loop over a collection of transcripts.
//!
//! Transcripts are processed strictly sequentially, each with fresh loop
//! state. A per-transcript failure is recorded against that transcript's slot
//! and the batch continues; only fatal configuration errors abort the run.

use colored::*;

use crate::error::{JudgrError, Result};
use crate::runner::{ConvergenceLoop, LoopReport};
use crate::transcripts::TranscriptEntry;

/// Outcome slot for one transcript, in input order.
#[derive(Debug)]
pub struct TranscriptReport {
    pub name: String,
    pub outcome: Result<LoopReport>,
}

impl TranscriptReport {
    /// Iteration count, if this transcript converged.
    pub fn iterations(&self) -> Option<u32> {
        self.outcome.as_ref().ok().map(|r| r.iterations)
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub transcripts: Vec<TranscriptReport>,
}

impl BatchReport {
    /// Per-transcript iteration counts in input order; None marks a failure.
    pub fn iteration_counts(&self) -> Vec<Option<u32>> {
        self.transcripts.iter().map(|t| t.iterations()).collect()
    }

    /// Final verdict of the last converged transcript.
    pub fn final_verdict(&self) -> Option<&crate::judge::Verdict> {
        self.transcripts
            .iter()
            .rev()
            .find_map(|t| t.outcome.as_ref().ok())
            .map(|report| &report.verdict)
    }

    /// Final recommendations: the last converged transcript's action items.
    pub fn final_recommendations(&self) -> Option<&[String]> {
        self.final_verdict().and_then(|v| v.action_items())
    }

    /// Number of transcripts that failed.
    pub fn failure_count(&self) -> usize {
        self.transcripts
            .iter()
            .filter(|t| t.outcome.is_err())
            .count()
    }
}

/// Drives the convergence loop across transcripts.
pub struct BatchDriver {
    convergence: ConvergenceLoop,
}

impl BatchDriver {
    /// Create a driver around a configured convergence loop.
    pub fn new(convergence: ConvergenceLoop) -> Self {
        Self { convergence }
    }

    /// Run every transcript through a fresh convergence loop.
    ///
    /// Only fatal errors propagate; everything else lands in the report.
    pub async fn run(&self, entries: Vec<TranscriptEntry>) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for entry in entries {
            let outcome = match entry.text {
                Ok(ref text) => self.convergence.run(text).await,
                Err(error) => Err(error),
            };

            let outcome = match outcome {
                Ok(loop_report) => {
                    println!(
                        "{} {} converged in {} iterations",
                        "ok:".green(),
                        entry.name,
                        loop_report.iterations
                    );
                    Ok(loop_report)
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    println!("{} {}: {}", "failed:".red(), entry.name, e);
                    log::warn!("Transcript {} failed: {}", entry.name, e);
                    Err(e)
                }
            };

            report.transcripts.push(TranscriptReport {
                name: entry.name,
                outcome,
            });
        }

        Ok(report)
    }
}
