//! Digital Filters
//!
//! Provides the stateful biquad section and the per-channel cascade built
//! from it. Coefficients always come from [`super::filter_design`].

use heapless::Vec;

use super::filter_design::{BiquadCoeffs, FilterSpec};
use crate::config::MAX_STAGES;
use crate::types::{ConfigError, SampleRate};

/// Biquad filter state
///
/// Implements Direct Form II Transposed. Single precision throughout and
/// no denormal guarding; audio that keeps revisiting zero flushes the
/// state on its own.
#[derive(Clone, Copy, Debug)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    /// State variables
    z1: f32,
    z2: f32,
}

impl Biquad {
    /// Create a new biquad filter with given coefficients
    #[must_use]
    pub const fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Process a single sample through the filter
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }

    /// Process a block of samples in-place
    pub fn process_block(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Install new coefficients (resets state)
    ///
    /// Stale delay values from the previous response would otherwise
    /// produce a transient on the first samples after the change.
    pub fn configure(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
        self.reset();
    }

    /// Get current coefficients
    #[must_use]
    pub fn coeffs(&self) -> BiquadCoeffs {
        self.coeffs
    }

    /// Current delay state `(z1, z2)`
    #[must_use]
    pub fn state(&self) -> (f32, f32) {
        (self.z1, self.z2)
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new(BiquadCoeffs::UNITY)
    }
}

/// Ordered cascade of biquad sections for one channel
///
/// Capacity is fixed at [`MAX_STAGES`] so building a chain never touches
/// the heap. Stage order is preserved exactly as configured.
#[derive(Clone, Debug, Default)]
pub struct FilterChain {
    stages: Vec<Biquad, MAX_STAGES>,
}

impl FilterChain {
    /// Create an empty (pass-through) chain
    #[must_use]
    pub const fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Validate and design every stage at `fs`
    ///
    /// # Errors
    /// Returns the first stage that fails [`FilterSpec::validate`], or
    /// [`ConfigError::TooManyStages`] if `specs` exceeds the capacity.
    pub fn from_specs(specs: &[FilterSpec], fs: SampleRate) -> Result<Self, ConfigError> {
        if specs.len() > MAX_STAGES {
            return Err(ConfigError::TooManyStages {
                requested: specs.len(),
                capacity: MAX_STAGES,
            });
        }
        let mut chain = Self::new();
        for spec in specs {
            spec.validate(fs)?;
            chain.push(spec.design(fs))?;
        }
        Ok(chain)
    }

    /// Append a stage designed from `coeffs`
    ///
    /// # Errors
    /// Returns [`ConfigError::TooManyStages`] when the chain is full.
    pub fn push(&mut self, coeffs: BiquadCoeffs) -> Result<(), ConfigError> {
        self.stages
            .push(Biquad::new(coeffs))
            .map_err(|_| ConfigError::TooManyStages {
                requested: self.stages.len() + 1,
                capacity: MAX_STAGES,
            })
    }

    /// Process a single sample through every stage in order
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.stages
            .iter_mut()
            .fold(input, |sample, stage| stage.process(sample))
    }

    /// Process a block of samples in-place
    pub fn process_block(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Reset every stage
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Number of stages
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when the chain has no stages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Borrow the stages in processing order
    #[must_use]
    pub fn stages(&self) -> &[Biquad] {
        &self.stages
    }
}
