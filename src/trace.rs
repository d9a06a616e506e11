// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-iteration error trace and its legacy text output format.

use std::io::{self, Write};

use crate::metrics::ErrorMetric;

/// One `(elapsed, value)` sample appended after each iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceSample {
    /// Wall-clock seconds since the solver was constructed.
    pub elapsed_seconds: f64,
    /// Metric value for the replay field produced by this iteration.
    pub value: f64,
}

/// Append-only convergence record for one run.
///
/// Grown monotonically by the solver, one sample per iteration, and never
/// mutated afterwards.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorTrace {
    metric: ErrorMetric,
    samples: Vec<TraceSample>,
}

impl ErrorTrace {
    pub fn new(metric: ErrorMetric) -> Self {
        Self {
            metric,
            samples: Vec::new(),
        }
    }

    pub fn metric(&self) -> ErrorMetric {
        self.metric
    }

    pub(crate) fn push(&mut self, elapsed_seconds: f64, value: f64) {
        self.samples.push(TraceSample {
            elapsed_seconds,
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    /// Time axis for plotting collaborators.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.elapsed_seconds).collect()
    }

    /// Metric axis for plotting collaborators.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Writes the trace in the legacy tab-separated format:
    /// a `Time(s) \t <metric>` header, then one `%.3f \t %.3f` row per
    /// iteration.
    pub fn write_tsv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "Time(s) \t {}", self.metric.name())?;
        for s in &self.samples {
            writeln!(out, "{:.3} \t {:.3}", s.elapsed_seconds, s.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv_matches_legacy_format() {
        let mut trace = ErrorTrace::new(ErrorMetric::Psnr);
        trace.push(0.0124, 18.7312);
        trace.push(0.0257, 21.0491);

        let mut buf = Vec::new();
        trace.write_tsv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Time(s) \t PSNR\n0.012 \t 18.731\n0.026 \t 21.049\n");
    }

    #[test]
    fn trace_grows_one_sample_per_push() {
        let mut trace = ErrorTrace::new(ErrorMetric::Mse);
        assert!(trace.is_empty());
        trace.push(0.1, 0.5);
        trace.push(0.2, 0.25);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.times(), vec![0.1, 0.2]);
        assert_eq!(trace.values(), vec![0.5, 0.25]);
    }
}
