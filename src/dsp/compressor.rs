//! Envelope follower and compressor
//!
//! Optional dynamics stage between the baseband filters and the
//! modulator. Peak-following envelope with separate attack and release
//! time constants; gain reduction above a threshold at a fixed ratio.

#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use crate::types::{ConfigError, SampleRate};

/// Compressor configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressorConfig {
    /// Run the stage; when false it is an exact pass-through
    pub enabled: bool,
    /// Envelope level above which gain is reduced (linear, > 0)
    pub threshold: f32,
    /// Compression ratio (>= 1)
    pub ratio: f32,
    /// Attack time constant in seconds
    pub attack_s: f32,
    /// Release time constant in seconds
    pub release_s: f32,
}

impl CompressorConfig {
    /// Check the settings
    ///
    /// Disabled configurations are always accepted.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidCompressor`] when the threshold is not
    /// positive, the ratio is below 1 or a time constant is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        let threshold_ok = self.threshold.is_finite() && self.threshold > 0.0;
        let ratio_ok = self.ratio.is_finite() && self.ratio >= 1.0;
        let times_ok = self.attack_s.is_finite()
            && self.attack_s >= 0.0
            && self.release_s.is_finite()
            && self.release_s >= 0.0;
        if threshold_ok && ratio_ok && times_ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidCompressor)
        }
    }
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 0.5,
            ratio: 4.0,
            attack_s: 0.005,
            release_s: 0.100,
        }
    }
}

#[cfg(defmt_log)]
impl defmt::Format for CompressorConfig {
    fn format(&self, f: defmt::Formatter) {
        if self.enabled {
            defmt::write!(
                f,
                "thr={} ratio={} atk={}s rel={}s",
                self.threshold,
                self.ratio,
                self.attack_s,
                self.release_s
            );
        } else {
            defmt::write!(f, "off");
        }
    }
}

/// One-pole smoothing coefficient for time constant `tau` seconds
///
/// `1 - exp(-1 / (tau * fs))`; a zero time constant tracks instantly.
#[must_use]
pub fn time_constant_coeff(tau: f32, fs: SampleRate) -> f32 {
    let samples = tau * fs.as_hz();
    if samples <= 0.0 {
        1.0
    } else {
        1.0 - (-1.0 / samples).exp()
    }
}

/// Compressor state
#[derive(Clone, Copy, Debug)]
pub struct Compressor {
    /// Envelope follower output
    envelope: f32,
    /// Attack coefficient (cached)
    attack_coeff: f32,
    /// Release coefficient (cached)
    release_coeff: f32,
    threshold: f32,
    /// `1/ratio - 1`, exponent applied to `env / threshold`
    exponent: f32,
    /// Last applied gain (linear)
    gain: f32,
}

impl Compressor {
    /// Create a compressor for a stream at `fs`
    ///
    /// A disabled configuration yields [`Compressor::bypass`].
    #[must_use]
    pub fn new(config: &CompressorConfig, fs: SampleRate) -> Self {
        if !config.enabled {
            return Self::bypass();
        }
        Self {
            envelope: 0.0,
            attack_coeff: time_constant_coeff(config.attack_s, fs),
            release_coeff: time_constant_coeff(config.release_s, fs),
            threshold: config.threshold,
            exponent: 1.0 / config.ratio - 1.0,
            gain: 1.0,
        }
    }

    /// Identity stage: the envelope never crosses an infinite threshold
    #[must_use]
    pub const fn bypass() -> Self {
        Self {
            envelope: 0.0,
            attack_coeff: 1.0,
            release_coeff: 1.0,
            threshold: f32::INFINITY,
            exponent: 0.0,
            gain: 1.0,
        }
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let abs_input = input.abs();

        let coeff = if abs_input > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope += coeff * (abs_input - self.envelope);

        self.gain = if self.envelope > self.threshold {
            (self.envelope / self.threshold).powf(self.exponent)
        } else {
            1.0
        };

        input * self.gain
    }

    /// Process a block of samples in-place
    pub fn process_block(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Get current envelope level
    #[must_use]
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// Last applied gain reduction in dB (0 or negative)
    #[must_use]
    pub fn gain_reduction_db(&self) -> f32 {
        20.0 * self.gain.log10()
    }

    /// True for the identity stage
    #[must_use]
    pub fn is_bypass(&self) -> bool {
        self.threshold == f32::INFINITY
    }

    /// Reset compressor state
    pub fn reset(&mut self) {
        self.envelope = 0.0;
        self.gain = 1.0;
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::bypass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate() -> SampleRate {
        SampleRate::from_hz(48_000.0).unwrap()
    }

    #[test]
    fn coefficient_formula() {
        // tau = 1 sample -> 1 - e^-1
        let coeff = time_constant_coeff(1.0 / 48_000.0, rate());
        assert!((coeff - (1.0 - (-1.0f32).exp())).abs() < 1e-4);
        assert_eq!(time_constant_coeff(0.0, rate()), 1.0);
    }

    #[test]
    fn bypass_is_identity() {
        let mut comp = Compressor::bypass();
        for x in [0.0, 1.0, -1.0, 0.25, 4.0] {
            assert_eq!(comp.process(x), x);
        }
        assert!(comp.is_bypass());
    }

    #[test]
    fn disabled_config_builds_bypass() {
        let comp = Compressor::new(&CompressorConfig::default(), rate());
        assert!(comp.is_bypass());
    }

    #[test]
    fn validation() {
        let mut config = CompressorConfig {
            enabled: true,
            ..CompressorConfig::default()
        };
        assert!(config.validate().is_ok());
        config.ratio = 0.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidCompressor));
        config.ratio = 2.0;
        config.threshold = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidCompressor));
    }
}
