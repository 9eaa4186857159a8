use super::summary::{FailureEntry, RunSummary};
use crate::error::OutputError;
use crate::runner::UnitReport;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects unit outcomes as they complete.
///
/// Successful reviews are written to the sink one whole block at a time;
/// failures are kept in memory for the final summary. A single lock covers
/// both, so concurrent callers never interleave partial blocks.
pub struct Aggregator<W> {
    inner: Mutex<Inner<W>>,
}

struct Inner<W> {
    sink: W,
    summary: RunSummary,
}

impl<W: Write> Aggregator<W> {
    pub fn new(sink: W) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sink,
                summary: RunSummary::default(),
            }),
        }
    }

    pub fn record(&self, report: &UnitReport) -> Result<(), OutputError> {
        let mut inner = self.lock();
        inner.summary.total += 1;

        match &report.outcome {
            Ok(review) => {
                let block = format_review_block(report, &review.text);
                let sink = &mut inner.sink;
                let written = sink
                    .write_all(block.as_bytes())
                    .and_then(|_| sink.flush())
                    .map_err(OutputError::WriteReport);

                // A review that never reached the sink counts against the run
                if let Err(e) = written {
                    inner.summary.failed += 1;
                    inner.summary.failures.push(FailureEntry {
                        path: report.path.clone(),
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
                inner.summary.succeeded += 1;
            }
            Err(error) => {
                inner.summary.failed += 1;
                inner.summary.failures.push(FailureEntry {
                    path: report.path.clone(),
                    reason: error.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Snapshot of the counts recorded so far
    pub fn summary(&self) -> RunSummary {
        self.lock().summary.clone()
    }

    pub fn into_parts(self) -> (RunSummary, W) {
        let inner = self.inner.into_inner().unwrap_or_else(PoisonError::into_inner);
        (inner.summary, inner.sink)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn format_review_block(report: &UnitReport, text: &str) -> String {
    let mut block = String::new();
    block.push_str(&format!("\n=== Review for {} ===\n", report.path.display()));
    block.push_str(&format!("File size: {} bytes\n", report.size));
    block.push_str(&format!("Review:\n{}\n\n", text.trim_end()));
    block
}
