//! Shared types used across the DSP chain
//!
//! This module defines domain-specific types that enforce invariants
//! at construction time and the configuration error reported before
//! streaming starts.

use core::fmt;

/// Audio sample rate in Hertz with validation
///
/// Any finite, strictly positive rate is accepted. The value is stored
/// as `f32` because every coefficient computation consumes it that way.
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct SampleRate(f32);

impl SampleRate {
    /// Create a sample rate, returns None if not finite and positive
    #[must_use]
    pub fn from_hz(hz: f32) -> Option<Self> {
        if hz.is_finite() && hz > 0.0 {
            Some(Self(hz))
        } else {
            None
        }
    }

    /// Get the rate in Hz
    #[must_use]
    pub const fn as_hz(self) -> f32 {
        self.0
    }

    /// Nyquist frequency (half the sample rate)
    #[must_use]
    pub fn nyquist(self) -> f32 {
        self.0 * 0.5
    }

    /// Duration of one sample in seconds
    #[must_use]
    pub fn period(self) -> f32 {
        1.0 / self.0
    }
}

impl fmt::Debug for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SampleRate({} Hz)", self.0)
    }
}

#[cfg(defmt_log)]
impl defmt::Format for SampleRate {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} Hz", self.0);
    }
}

/// IQ sample pair
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IqSample {
    /// In-phase component
    pub i: f32,
    /// Quadrature component
    pub q: f32,
}

impl IqSample {
    /// Create a new IQ sample
    #[must_use]
    pub const fn new(i: f32, q: f32) -> Self {
        Self { i, q }
    }

    /// Get magnitude
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        #[cfg(not(feature = "std"))]
        use micromath::F32Ext;
        (self.i * self.i + self.q * self.q).sqrt()
    }

    /// Mix against a quadrature carrier: `i·cos − q·sin`
    #[must_use]
    pub fn upconvert(&self, cos: f32, sin: f32) -> f32 {
        self.i * cos - self.q * sin
    }
}

/// Configuration rejected before streaming starts
///
/// The real-time path has no error channel: every problem a degenerate
/// filter or modulation setting would cause has to surface here, from
/// [`crate::engine::ModulationEngine::initialize`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// Sample rate is zero, negative or not finite
    InvalidSampleRate(f32),
    /// Filter frequency outside the open interval (0, Nyquist)
    FrequencyOutOfRange {
        /// Requested frequency in Hz
        frequency: f32,
        /// Nyquist frequency of the rate the stage runs at
        nyquist: f32,
    },
    /// Quality factor is zero, negative or not finite
    InvalidQ(f32),
    /// Shelf or peaking gain is not finite
    InvalidGain(f32),
    /// More stages than a filter chain can hold
    TooManyStages {
        /// Requested stage count
        requested: usize,
        /// Chain capacity
        capacity: usize,
    },
    /// Output channel routed to an input that does not exist
    InvalidRouting {
        /// Output channel index
        output: usize,
        /// Requested input channel index
        input: usize,
    },
    /// Compressor threshold, ratio or time constant out of range
    InvalidCompressor,
    /// Carrier frequency, level or depth out of range
    InvalidModulation,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSampleRate(hz) => write!(f, "invalid sample rate {hz} Hz"),
            Self::FrequencyOutOfRange { frequency, nyquist } => write!(
                f,
                "frequency {frequency} Hz outside (0, {nyquist}) Hz"
            ),
            Self::InvalidQ(q) => write!(f, "quality factor {q} must be positive"),
            Self::InvalidGain(db) => write!(f, "gain {db} dB is not finite"),
            Self::TooManyStages {
                requested,
                capacity,
            } => write!(f, "{requested} filter stages exceed capacity {capacity}"),
            Self::InvalidRouting { output, input } => {
                write!(f, "output {output} routed to missing input {input}")
            }
            Self::InvalidCompressor => f.write_str("compressor settings out of range"),
            Self::InvalidModulation => f.write_str("carrier or modulation settings out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(defmt_log)]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidSampleRate(hz) => defmt::write!(f, "invalid sample rate {} Hz", hz),
            Self::FrequencyOutOfRange { frequency, nyquist } => {
                defmt::write!(f, "frequency {} Hz outside (0, {}) Hz", frequency, nyquist);
            }
            Self::InvalidQ(q) => defmt::write!(f, "invalid Q {}", q),
            Self::InvalidGain(db) => defmt::write!(f, "invalid gain {} dB", db),
            Self::TooManyStages {
                requested,
                capacity,
            } => defmt::write!(f, "{} stages > capacity {}", requested, capacity),
            Self::InvalidRouting { output, input } => {
                defmt::write!(f, "output {} -> missing input {}", output, input);
            }
            Self::InvalidCompressor => defmt::write!(f, "invalid compressor"),
            Self::InvalidModulation => defmt::write!(f, "invalid modulation"),
        }
    }
}
