// SPDX-License-Identifier: AGPL-3.0-or-later

//! The domain-alternation loop.
//!
//! Each iteration projects the replay field onto the target amplitude, moves
//! to the hologram domain, applies the device constraint, moves back, and
//! samples an error metric. The solver is an explicit stepper rather than a
//! closed loop so callers can cancel, checkpoint or stream partial results;
//! [`Solver::run`] is the fixed-count driver the reference scripts hard-code.

use std::f64::consts::TAU;
use std::time::Instant;

use ndarray::{Array2, Zip};
use num_complex::Complex64;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::constraint::{HologramConstraint, Quantization};
use crate::error::{config, Result};
use crate::fft2::CenteredFft;
use crate::field::{self, ComplexField, POWER_CHECK_TOLERANCE};
use crate::metrics::ErrorMetric;
use crate::target::Target;
use crate::trace::{ErrorTrace, TraceSample};

/// Immutable run configuration, validated before the loop starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Fixed iteration count; the loop never terminates early.
    pub iterations: usize,
    pub quantization: Quantization,
    pub metric: ErrorMetric,
    /// Wyrowski-Bryngdahl spectral band-limit.
    pub band_limit: bool,
    /// Wyrowski-Bryngdahl power smoothing.
    pub power_smooth: bool,
    /// Seed for the random initial replay phase; reruns are deterministic.
    pub seed: u64,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(config("iteration count must be at least 1"));
        }
        self.quantization.validate()
    }

    fn constraint(&self) -> HologramConstraint {
        HologramConstraint {
            quantization: self.quantization,
            band_limit: self.band_limit,
            power_smooth: self.power_smooth,
        }
    }
}

impl Default for RunConfig {
    /// The reference defaults: 100 iterations, 256-level device, PSNR, plain
    /// Gerchberg-Saxton.
    fn default() -> Self {
        Self {
            iterations: 100,
            quantization: Quantization::Levels(256),
            metric: ErrorMetric::Psnr,
            band_limit: false,
            power_smooth: false,
            seed: 42,
        }
    }
}

/// Final artifacts of a run, exposed to display and logging collaborators.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The (possibly band-limit-rescaled) target the run converged towards.
    pub target: ComplexField,
    /// Final constrained hologram; its phase is what a device would render.
    pub hologram: ComplexField,
    /// Replay field of the final hologram; its amplitude is the reconstruction.
    pub replay: ComplexField,
    pub trace: ErrorTrace,
}

impl RunReport {
    /// Phase map of the hologram, for display collaborators.
    pub fn hologram_phase(&self) -> Array2<f64> {
        self.hologram.mapv(|v| v.arg())
    }

    /// Amplitude map of the reconstruction, for display collaborators.
    pub fn replay_amplitude(&self) -> Array2<f64> {
        self.replay.mapv(|v| v.norm())
    }
}

/// Resumable Gerchberg-Saxton / Wyrowski-Bryngdahl stepper.
///
/// The target is read-only shared state; hologram and replay are owned by
/// the current iteration and replaced wholesale each step, so there is
/// nothing to lock. Elapsed time is measured from construction.
pub struct Solver {
    config: RunConfig,
    constraint: HologramConstraint,
    fft: CenteredFft,
    target: ComplexField,
    replay: ComplexField,
    hologram: Option<ComplexField>,
    trace: ErrorTrace,
    iterations_done: usize,
    started: Instant,
}

impl Solver {
    /// Validates `config`, seeds the initial replay field with random unit
    /// phase, and applies the band-limit power rescale when needed.
    pub fn new(target: &Target, config: RunConfig) -> Result<Self> {
        config.validate()?;
        let constraint = config.constraint();
        let (height, width) = target.dim();

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut replay = Array2::from_shape_simple_fn((height, width), || {
            Complex64::from_polar(1.0, TAU * rng.gen::<f64>())
        });
        let mut working_target = target.field().clone();

        // The target is normalized assuming an all-ones hologram. With the
        // band-limit active only the central quarter-area survives, so the
        // reachable power level drops by 4 on amplitude.
        if config.band_limit {
            working_target.mapv_inplace(|v| v / 4.0);
            replay.mapv_inplace(|v| v / 4.0);
        }

        Ok(Self {
            constraint,
            fft: CenteredFft::new(height, width),
            target: working_target,
            replay,
            hologram: None,
            trace: ErrorTrace::new(config.metric),
            iterations_done: 0,
            started: Instant::now(),
            config,
        })
    }

    /// Runs one domain-alternation iteration and appends its trace sample.
    pub fn step(&mut self) -> Result<TraceSample> {
        // Replay-domain constraint: target amplitude, current phase.
        let constrained = Zip::from(&self.target)
            .and(&self.replay)
            .map_collect(|t, r| Complex64::from_polar(t.norm(), r.arg()));

        let raw = self.fft.inverse(&constrained);
        let hologram = self.constraint.apply(&raw);
        let replay = self.fft.forward(&hologram);

        let value = self.config.metric.evaluate(&self.target, &replay)?;
        let elapsed_seconds = self.started.elapsed().as_secs_f64();
        self.trace.push(elapsed_seconds, value);

        self.hologram = Some(hologram);
        self.replay = replay;
        self.iterations_done += 1;

        debug!(
            iteration = self.iterations_done,
            metric = %self.config.metric,
            value,
            elapsed_seconds,
            "iteration complete"
        );
        Ok(TraceSample {
            elapsed_seconds,
            value,
        })
    }

    /// Runs the configured fixed iteration count and finalizes.
    pub fn run(mut self) -> Result<RunReport> {
        let iterations = self.config.iterations;
        info!(
            iterations,
            quantization = %self.config.quantization,
            metric = %self.config.metric,
            band_limit = self.config.band_limit,
            power_smooth = self.config.power_smooth,
            "starting phase retrieval"
        );
        for _ in 0..iterations {
            self.step()?;
        }
        self.into_report()
    }

    /// Finalizes after however many steps the caller drove manually:
    /// recomputes the replay field from the final accepted hologram and runs
    /// the power sanity check.
    ///
    /// The check is skipped in Wyrowski-Bryngdahl mode, where band-limiting
    /// and power smoothing deliberately move fields off the canonical power
    /// level.
    pub fn into_report(self) -> Result<RunReport> {
        let hologram = self
            .hologram
            .ok_or_else(|| config("cannot finalize a solver before any iteration has run"))?;
        let replay = self.fft.forward(&hologram);

        if !self.constraint.is_wyrowski_bryngdahl() {
            field::check_power(&self.target, "target", POWER_CHECK_TOLERANCE)?;
            field::check_power(&hologram, "hologram", POWER_CHECK_TOLERANCE)?;
            field::check_power(&replay, "replay", POWER_CHECK_TOLERANCE)?;
        }

        info!(
            iterations = self.iterations_done,
            final_value = self.trace.samples().last().map(|s| s.value),
            "phase retrieval complete"
        );
        Ok(RunReport {
            target: self.target,
            hologram,
            replay,
            trace: self.trace,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn iterations_done(&self) -> usize {
        self.iterations_done
    }

    /// Replay field after the most recent step (the random initial field
    /// before any step has run).
    pub fn replay(&self) -> &ComplexField {
        &self.replay
    }

    /// Constrained hologram after the most recent step, if any.
    pub fn hologram(&self) -> Option<&ComplexField> {
        self.hologram.as_ref()
    }

    pub fn trace(&self) -> &ErrorTrace {
        &self.trace
    }
}
