//! Digital Oscillators
//!
//! Provides the phase-accumulator carrier used by the modulator.

use core::f32::consts::TAU;
#[cfg(not(feature = "std"))]
use micromath::F32Ext;

/// Output shape of the carrier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Waveform {
    /// `sin(2π·phase)`, range [-1, 1]
    #[default]
    Sine,
    /// `cos(2π·phase)`, range [-1, 1]
    Cosine,
    /// `(1 + sin(2π·phase)) / 2`, range [0, 1]
    ///
    /// Drives a transducer that only accepts a positive excursion.
    UnipolarSine,
}

impl Waveform {
    /// Evaluate the waveform at a phase in cycles
    #[inline]
    #[must_use]
    pub fn at(self, phase: f32) -> f32 {
        let radians = phase * TAU;
        match self {
            Self::Sine => radians.sin(),
            Self::Cosine => radians.cos(),
            Self::UnipolarSine => (1.0 + radians.sin()) * 0.5,
        }
    }
}

#[cfg(defmt_log)]
impl defmt::Format for Waveform {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Sine => defmt::write!(f, "sin"),
            Self::Cosine => defmt::write!(f, "cos"),
            Self::UnipolarSine => defmt::write!(f, "(1+sin)/2"),
        }
    }
}

/// Phase-accumulator oscillator
///
/// The phase is kept in cycles, confined to `[0, 1)`. Each tick adds
/// `freq / sample_rate` and subtracts exactly one period on overflow, so
/// the phase stays continuous across wraps and never loses precision to
/// a growing accumulator.
#[derive(Clone, Copy, Debug)]
pub struct PhaseOscillator {
    /// Current phase (0.0 to 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    waveform: Waveform,
}

impl PhaseOscillator {
    /// Create an oscillator at `freq_hz` for a stream at `sample_rate`
    #[must_use]
    pub fn new(freq_hz: f32, sample_rate: f32, waveform: Waveform) -> Self {
        let mut osc = Self {
            phase: 0.0,
            phase_inc: 0.0,
            waveform,
        };
        osc.set_frequency(freq_hz, sample_rate);
        osc
    }

    /// Set frequency (phase is preserved)
    pub fn set_frequency(&mut self, freq_hz: f32, sample_rate: f32) {
        self.phase_inc = freq_hz / sample_rate;
    }

    /// Return the waveform at the current phase, then advance
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let sample = self.waveform.at(self.phase);
        self.advance();
        sample
    }

    /// Return `(cos, sin)` at the current phase, then advance
    ///
    /// Used by the quadrature combiner regardless of the selected waveform.
    #[inline]
    pub fn tick_iq(&mut self) -> (f32, f32) {
        let radians = self.phase * TAU;
        let iq = (radians.cos(), radians.sin());
        self.advance();
        iq
    }

    #[inline]
    fn advance(&mut self) {
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }

    /// Reset phase
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Get current phase in cycles
    #[must_use]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Get per-sample phase increment in cycles
    #[must_use]
    pub fn phase_increment(&self) -> f32 {
        self.phase_inc
    }

    /// Selected output waveform
    #[must_use]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}
